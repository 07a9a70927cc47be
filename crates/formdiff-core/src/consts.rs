/// Landmarks produced per frame by the pose model.
pub const LANDMARK_COUNT: usize = 33;

/// Components per landmark (normalized x, normalized y, relative depth).
pub const LANDMARK_DIMS: usize = 3;

/// Mean landmark distance above which a frame pair counts as divergent.
pub const DEFAULT_LANDMARK_THRESHOLD: f64 = 0.5;

/// Fraction of pixel-diff samples kept by the ranker.
pub const DEFAULT_SELECT_FRACTION: f64 = 0.10;

/// Samples on either side of a selected sample (one second at 30 fps).
pub const DEFAULT_CONTEXT_RADIUS: usize = 30;

/// Minimum grayscale difference (0-255) for the localizer to name a region.
pub const DEFAULT_REGION_SENSITIVITY: u8 = 50;

/// Output frame rate of the rendered comparison.
pub const OUTPUT_FPS: u32 = 30;

/// Default encoder passed to ffmpeg for the rendered comparison.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// Label used when no region can be named.
pub const UNKNOWN_REGION: &str = "Unknown";

/// Side length of the square space the region map is defined in.
pub const REGION_CANONICAL_SIZE: u32 = 100;

/// Square input side of the BlazePose full-body landmark model.
pub const DEFAULT_POSE_INPUT_SIZE: u32 = 256;

/// Default subject presence score below which the pose model reports nobody.
pub const DEFAULT_PRESENCE_THRESHOLD: f32 = 0.5;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Integer scale applied to the 8x8 label glyphs.
pub const LABEL_GLYPH_SCALE: u32 = 3;

/// Offset of the burned-in label from the top-left corner, in pixels.
pub const LABEL_MARGIN: u32 = 10;

/// Input extensions accepted by the job runner.
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["mp4", "mov"];
