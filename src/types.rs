/// Unique domain name within one resolved source.
/// Examples: `alpha`, `coco_captions`, `drawings_v2`
pub type DomainName = String;
/// Key of a named group inside a composite store file.
/// Example: `alpha` for the top-level entry `{"alpha": {...}}`
pub type GroupKey = String;
/// Opaque image payload bytes. Never decoded by the provider.
pub type ImageBytes = Vec<u8>;
/// Decoded caption text paired with an image at the same index.
/// Example: `a photograph of a red bicycle leaning against a wall`
pub type Caption = String;
