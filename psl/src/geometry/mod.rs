//! Composite symbols: vectors, math arcs and wedges.
//!
//! The geometry of these symbols is computed here in user units, relative to
//! a local frame in which the symbol is axis aligned. Writing the resulting
//! paths is left to the session.

pub(crate) mod matharc;
pub(crate) mod vector;
pub(crate) mod wedge;

use crate::error::Error;
use bitflags::bitflags;
use kurbo::Point;

/// The shape of a head at one end of a vector or math arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadKind {
    /// A filled arrow head, optionally with a notched back.
    #[default]
    Arrow,
    /// A line perpendicular to the shaft.
    Terminal,
    /// A circle centered on the end point.
    Circle,
    /// A square centered on the end point.
    Square,
    /// Feathers pointing away from the end point.
    Tail,
    /// An open arrow drawn with the head pen.
    ArrowPlain,
    /// Open feathers drawn with the head pen.
    TailPlain,
}

bitflags! {
    /// Which heads a vector or math arc has, and how they are drawn.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VectorStatus: u32 {
        /// A head at the start.
        const BEGIN = 1;
        /// A head at the end.
        const END = 2;
        /// Only the left half of the start head.
        const BEGIN_L = 4;
        /// Only the right half of the start head.
        const BEGIN_R = 8;
        /// Only the left half of the end head.
        const END_L = 16;
        /// Only the right half of the end head.
        const END_R = 32;
        /// Outline the heads with the head pen.
        const OUTLINE = 2048;
        /// Fill the heads with the current fill.
        const FILL = 8192;
        /// Draw a right angle symbol for math arcs spanning 90 degrees.
        const MARC90 = 32768;
        /// Shorten the start by the start trim.
        const OFF_BEGIN = 65536;
        /// Shorten the end by the end trim.
        const OFF_END = 131072;
        /// Place the end head at the middle, pointing forward.
        const MID_FWD = 262144;
        /// Place the start head at the middle, pointing backward.
        const MID_BWD = 524288;
    }
}

impl VectorStatus {
    /// The heads as a two bit mask, 1 for the start and 2 for the end.
    pub(crate) fn heads(self) -> u32 {
        self.bits() & 3
    }

    /// The side of head `i`: -1 for the left half only, +1 for the right
    /// half only, 0 for a full head.
    pub(crate) fn side(self, i: usize) -> i32 {
        match (self.bits() >> (2 + 2 * i)) & 3 {
            0 => 0,
            v => 2 * v as i32 - 3,
        }
    }
}

/// A straight vector from the anchor point to `tip`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorParams {
    /// The head end of the vector.
    pub tip: Point,
    /// The width of the shaft.
    pub tail_width: f64,
    /// The length of a head.
    pub head_length: f64,
    /// The full width of a head.
    pub head_width: f64,
    /// The notch of arrow heads, from 0 (flat back) to 1.
    pub head_shape: f64,
    /// Heads and their drawing.
    pub status: VectorStatus,
    /// The head kinds at the start and the end.
    pub kinds: [HeadKind; 2],
    /// How much to shorten the start and the end.
    pub trim: [f64; 2],
    /// The pen width of the heads in points.
    pub head_pen_width: f64,
}

/// The polygonal vector of early plot formats, with the shaft and heads
/// drawn as a single filled outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorV4Params {
    /// The head end of the vector.
    pub tip: Point,
    /// The width of the shaft.
    pub tail_width: f64,
    /// The length of a head.
    pub head_length: f64,
    /// The half width of a head.
    pub head_width: f64,
    /// The notch of the heads, from 0 (flat back) to 1.
    pub head_shape: f64,
    /// Whether both ends get a head.
    pub double_head: bool,
    /// Whether the outline is stroked.
    pub outline: bool,
}

/// A circular arc around the anchor point with optional heads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MathArcParams {
    /// The radius of the arc.
    pub radius: f64,
    /// The start and end angles in degrees.
    pub angles: [f64; 2],
    /// The length of a head.
    pub head_length: f64,
    /// The full width of a head.
    pub head_width: f64,
    /// The width of the arc line.
    pub arc_width: f64,
    /// The notch of arrow heads, from 0 (flat back) to 1.
    pub head_shape: f64,
    /// Heads and their drawing.
    pub status: VectorStatus,
    /// The head kinds at the start and the end.
    pub kinds: [HeadKind; 2],
    /// How much to shorten the start and the end, in degrees.
    pub trim: [f64; 2],
    /// The pen width of the heads in points.
    pub head_pen_width: f64,
}

bitflags! {
    /// The gridlines drawn over a wedge.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WedgeStatus: u32 {
        /// Arcs at multiples of the radial step.
        const ARCS = 1;
        /// Radial lines at multiples of the angular step.
        const RADIALS = 2;
    }
}

/// A pie wedge around the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WedgeParams {
    /// The outer radius.
    pub radius: f64,
    /// The start and end angles in degrees.
    pub angles: [f64; 2],
    /// Gridlines to draw with the spider pen.
    pub status: WedgeStatus,
    /// The inner radius. A positive value cuts out a windshield.
    pub inner_radius: f64,
    /// The step between arcs, or 0 for the bounding arcs only.
    pub dr: f64,
    /// The step between radial lines, or 0 for the bounding sides only.
    pub da: f64,
    /// Whether the wedge is filled with the current fill.
    pub fill: bool,
    /// Whether the wedge is outlined with the current pen.
    pub outline: bool,
}

/// A symbol scaled by the diameter of its circumscribing circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    /// `+`
    Plus,
    /// A horizontal dash.
    XDash,
    /// A vertical dash.
    YDash,
    /// `x`
    Cross,
    /// A single dot.
    Dot,
    /// A five pointed star.
    Star,
    /// A circle.
    Circle,
    /// A diamond.
    Diamond,
    /// A hexagon.
    Hexagon,
    /// An octagon.
    Octagon,
    /// A triangle pointing down.
    InvTriangle,
    /// A pentagon.
    Pentagon,
    /// A square.
    Square,
    /// A triangle pointing up.
    Triangle,
}

impl MarkKind {
    /// The suffix of the drawing procedure.
    pub(crate) fn code(self) -> char {
        match self {
            Self::Plus => '+',
            Self::XDash => '-',
            Self::YDash => 'y',
            Self::Cross => 'x',
            Self::Dot => 'p',
            Self::Star => 'a',
            Self::Circle => 'c',
            Self::Diamond => 'd',
            Self::Hexagon => 'h',
            Self::Octagon => 'g',
            Self::InvTriangle => 'i',
            Self::Pentagon => 'n',
            Self::Square => 's',
            Self::Triangle => 't',
        }
    }
}

impl TryFrom<u8> for MarkKind {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            b'+' => Self::Plus,
            b'-' => Self::XDash,
            b'y' => Self::YDash,
            b'x' => Self::Cross,
            b'p' => Self::Dot,
            b'a' => Self::Star,
            b'c' => Self::Circle,
            b'd' => Self::Diamond,
            b'h' => Self::Hexagon,
            b'g' => Self::Octagon,
            b'i' => Self::InvTriangle,
            b'n' => Self::Pentagon,
            b's' => Self::Square,
            b't' => Self::Triangle,
            _ => {
                lwarn!("unknown symbol code {}", code as char);
                return Err(Error::BadSymbol);
            }
        })
    }
}

/// A symbol placed at an anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Symbol {
    /// A mark of the given diameter.
    Mark(MarkKind, f64),
    /// An ellipse with the major axis at `angle` degrees.
    Ellipse {
        /// The direction of the major axis.
        angle: f64,
        /// The length of the major axis.
        major: f64,
        /// The length of the minor axis.
        minor: f64,
    },
    /// An axis aligned rectangle.
    Rect {
        /// The width.
        width: f64,
        /// The height.
        height: f64,
    },
    /// An axis aligned rectangle with rounded corners.
    RoundRect {
        /// The width.
        width: f64,
        /// The height.
        height: f64,
        /// The corner radius.
        radius: f64,
    },
    /// A rectangle rotated by `angle` degrees.
    RotRect {
        /// The rotation.
        angle: f64,
        /// The width.
        width: f64,
        /// The height.
        height: f64,
    },
    /// A pie wedge.
    Wedge(WedgeParams),
    /// An arc with heads.
    MathArc(MathArcParams),
    /// A straight vector with heads.
    Vector(VectorParams),
}
