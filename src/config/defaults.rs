pub const DEFAULT_RECORDER_CMD: &str = "wf-recorder";
pub const DEFAULT_CODEC: &str = "libx264";
pub const DEFAULT_CRF: u8 = 14;
pub const DEFAULT_EXTENSION: &str = ".mkv";
pub const DEFAULT_OUTPUT_DIR: &str = ".";
/// x264/x265 accept 0..=51.
pub const MAX_CRF: u8 = 51;

pub(super) const MAX_EXTENSION_CHARS: usize = 16;
pub(super) const MAX_CODEC_CHARS: usize = 64;
// Recorders accepted by bare name; anything else must be an executable path.
pub(super) const KNOWN_RECORDERS: &[&str] = &["wf-recorder"];
