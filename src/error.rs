//! Error types shared by the geometry model and the pattern codec.

use derive_more::{Display, Error, From};

use crate::arena::Generation;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Every way geometry derivation, encoding, or decoding can fail.
///
/// Failures are plain values: the codec never panics on malformed input and never
/// returns partial output alongside an error.
#[derive(Debug, Display, Error, From, Clone, PartialEq, Eq)]
pub enum Error {
    /// The arena description is inconsistent.
    #[display("invalid arena geometry: {_0}")]
    #[from]
    Geometry(GeometryError),
    /// The pattern does not fit the geometry, or a decoded header is self-inconsistent.
    #[display("invalid pattern: {_0}")]
    #[from]
    Validation(ValidationError),
    /// A pixel or stretch value does not fit the declared bit depth.
    #[display("value {value} exceeds maximum {max} for the declared bit depth")]
    ValueOutOfRange {
        /// The offending value.
        value: u8,
        /// Largest value the bit depth can hold.
        max: u8,
    },
    /// The header version discriminant is not one this crate knows.
    #[display("unsupported header version {version}")]
    UnsupportedVersion {
        /// The discriminant as read from the header.
        version: u8,
    },
    /// The generation (by name, magic, or id) has no pattern format here.
    #[display("unsupported generation: {detail}")]
    UnsupportedGeneration {
        /// What was rejected.
        detail: &'static str,
    },
    /// Fewer bytes are present than the header says are needed.
    #[display("truncated data: needed {needed} bytes, found {available}")]
    TruncatedData {
        /// Bytes required from the start of the buffer.
        needed: usize,
        /// Bytes actually present.
        available: usize,
    },
    /// A panel-row identification byte does not match its 1-based row index.
    #[display("corrupt row header: expected row id {expected}, found {found}")]
    CorruptRowHeader {
        /// 1-based panel row the block belongs to.
        expected: u8,
        /// Row id byte found in the data.
        found: u8,
    },
}

/// Why an [`ArenaConfig`](crate::arena::ArenaConfig) could not become an
/// [`ArenaGeometry`](crate::arena::ArenaGeometry).
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// The grid has no rows or no columns.
    #[display("arena needs at least one panel row and column (got {num_panel_rows}x{num_panel_cols})")]
    ZeroPanels {
        /// Panel rows configured.
        num_panel_rows: u8,
        /// Panel columns configured.
        num_panel_cols: u8,
    },
    /// The grid is wider than any header can record.
    #[display("{num_panel_cols} panel columns exceeds the maximum of {max}")]
    TooManyColumns {
        /// Panel columns configured.
        num_panel_cols: u8,
        /// Widest grid a header can describe.
        max: usize,
    },
    /// A stated panel size disagrees with the generation.
    #[display("{generation} panels have {expected} pixels per side, not {found}")]
    PixelsPerPanelMismatch {
        /// Generation of the arena.
        generation: Generation,
        /// Panel size fixed by the generation.
        expected: u16,
        /// Panel size the configuration stated.
        found: u16,
    },
    /// An installed column index lies outside the grid.
    #[display("installed column {column} is outside a {num_panel_cols}-column arena")]
    ColumnOutOfRange {
        /// The offending physical column.
        column: u8,
        /// Panel columns in the grid.
        num_panel_cols: u8,
    },
    /// Installed columns are unsorted or repeated.
    #[display("installed columns must be strictly increasing ({column} follows {previous})")]
    ColumnsNotIncreasing {
        /// Column listed first.
        previous: u8,
        /// Column listed after it.
        column: u8,
    },
    /// A partial arena lists no columns at all.
    #[display("columns_installed is present but empty")]
    NoColumnsInstalled,
}

/// Why a pattern (or a decoded header) does not satisfy the format's invariants.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A pattern (or header) has zero frames along an axis.
    #[display("frame axes must be non-zero (x_num {x_num}, y_num {y_num})")]
    EmptyFrameAxis {
        /// Frames along x.
        x_num: u16,
        /// Frames along y.
        y_num: u16,
    },
    /// The frame count disagrees with `x_num * y_num`.
    #[display("expected {expected} frames, found {found}")]
    FrameCountMismatch {
        /// `x_num * y_num`.
        expected: usize,
        /// Frames present or declared.
        found: usize,
    },
    /// More frames (or bytes) than the format or the platform can address.
    #[display("{frames} frames exceeds the format maximum of {max}")]
    FrameCountOverflow {
        /// Frames requested.
        frames: usize,
        /// Largest count that fits.
        max: usize,
    },
    /// A frame is not the arena's pixel size.
    #[display(
        "frame {index} is {width}x{height} pixels, arena is {expected_width}x{expected_height}"
    )]
    FrameSizeMismatch {
        /// Storage index of the frame.
        index: usize,
        /// Arena width in pixels.
        expected_width: u16,
        /// Arena height in pixels.
        expected_height: u16,
        /// Frame width in pixels.
        width: u16,
        /// Frame height in pixels.
        height: u16,
    },
    /// A frame coordinate lies outside the pattern.
    #[display("frame ({x_index}, {y_index}) is outside a {x_num}x{y_num} pattern")]
    FrameIndexOutOfRange {
        /// Requested x index.
        x_index: u16,
        /// Requested y index.
        y_index: u16,
        /// Frames along x.
        x_num: u16,
        /// Frames along y.
        y_num: u16,
    },
    /// There is not exactly one stretch value per frame.
    #[display("expected {expected} stretch values, found {found}")]
    StretchLengthMismatch {
        /// Frames in the pattern.
        expected: usize,
        /// Stretch values present.
        found: usize,
    },
    /// An identifier is too wide for its header field.
    #[display("{field} {value} exceeds maximum {max}")]
    IdOutOfRange {
        /// Which identifier.
        field: &'static str,
        /// The identifier's value.
        value: u8,
        /// Largest value the field holds.
        max: u8,
    },
    /// A `generation_id` names a different generation than the arena or caller.
    #[display("generation_id {found} does not match the arena's generation (id {expected})")]
    GenerationIdMismatch {
        /// Id of the expected generation.
        expected: u8,
        /// Id found in the pattern or header.
        found: u8,
    },
    /// Counter-clockwise order requested with a V1 header.
    #[display("counter-clockwise column order cannot be recorded in a V1 header")]
    ColumnOrderNotRecordable,
    /// A G6 pattern uses the y frame axis.
    #[display("G6 patterns have a single frame axis (y_num must be 1, found {y_num})")]
    MultiAxisUnsupported {
        /// Frames along y.
        y_num: u16,
    },
    /// A G6 column mask disagrees with the declared column count.
    #[display("column mask has {installed} installed columns but the header declares {declared}")]
    ColumnMaskMismatch {
        /// Column count in the header.
        declared: u8,
        /// Bits set in the mask.
        installed: u32,
    },
    /// The header's grayscale level count has no bit depth.
    #[display("{levels} grayscale levels is neither 2 nor 16")]
    UnsupportedGrayscaleLevels {
        /// Levels as read from the header.
        levels: u8,
    },
    /// The panel's rows do not divide evenly into subpanels.
    #[display("{pixels_per_panel}-pixel panels cannot be split into {subpanel_count} subpanels")]
    UnevenSubpanels {
        /// Pixels along one side of a panel.
        pixels_per_panel: u16,
        /// Subpanels per panel row.
        subpanel_count: u8,
    },
    /// A frame has the wrong number of panel blocks.
    #[display("expected {expected} panel blocks per frame, found {found}")]
    BlockCountMismatch {
        /// Blocks the geometry needs.
        expected: usize,
        /// Blocks supplied.
        found: usize,
    },
    /// A panel block holds the wrong number of pixels.
    #[display("panel block {index} holds {found} pixels, expected {expected}")]
    BlockSizeMismatch {
        /// Position of the block in the frame.
        index: usize,
        /// Pixels the geometry needs.
        expected: usize,
        /// Pixels supplied.
        found: usize,
    },
}
