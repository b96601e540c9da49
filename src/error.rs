use std::path::PathBuf;

/// Errors raised around the lane core: configuration, image I/O and batch output.
///
/// The core itself never fails; degenerate input only reduces the number of
/// lines drawn.
#[derive(thiserror::Error, Debug)]
pub enum LaneError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("image error for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image dimensions {actual:?} do not match frame {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Why a single stroke could not be drawn. The rest of the frame is unaffected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("canvas has no pixels")]
    EmptyCanvas,
    #[error("stroke thickness must be positive")]
    ZeroThickness,
    #[error("stroke from {from} to {to} lies entirely outside the {width}x{height} canvas")]
    OffCanvas {
        from: crate::geometry::Point,
        to: crate::geometry::Point,
        width: u32,
        height: u32,
    },
}
