//! Face model - sticker storage, quarter-turn algebra and solved detection
//!
//! A quarter turn does two things:
//!
//! 1. permutes the turned face's own 9 stickers through a fixed cycle
//!    ([`CW_CYCLE`] / [`CCW_CYCLE`]), and
//! 2. carries the four 3-sticker strips bordering that face one step around
//!    the face (12 stickers on the four neighbouring faces).
//!
//! All operations are pure: they take a [`Faces`] by reference and return a
//! new value. Nothing here knows about history, modes or the tutorial.

use serde::{Deserialize, Serialize};

use crate::types::Face::{Back as BK, Bottom as DN, Front as FR, Left as LF, Right as RT, Top as UP};
use crate::types::{Color, CubeError, Direction, Face, FACE_COUNT, STICKERS_PER_FACE};

/// The 9 stickers of one face, row-major.
pub type FaceStickers = [Color; STICKERS_PER_FACE];

/// Clockwise own-face cycle: output position `i` takes input `CW_CYCLE[i]`.
pub const CW_CYCLE: [usize; STICKERS_PER_FACE] = [6, 3, 0, 7, 4, 1, 8, 5, 2];

/// Counterclockwise own-face cycle, the inverse of [`CW_CYCLE`].
pub const CCW_CYCLE: [usize; STICKERS_PER_FACE] = [2, 5, 8, 1, 4, 7, 0, 3, 6];

type Strip = [(Face, usize); 3];

/// Border strips per face (indexed by `Face::index`), in clockwise travel
/// order: a clockwise turn carries strip `j` onto strip `j + 1`.
const ADJACENT: [[Strip; 4]; FACE_COUNT] = [
    // Front
    [
        [(UP, 6), (UP, 7), (UP, 8)],
        [(RT, 0), (RT, 3), (RT, 6)],
        [(DN, 2), (DN, 1), (DN, 0)],
        [(LF, 8), (LF, 5), (LF, 2)],
    ],
    // Back
    [
        [(UP, 0), (UP, 1), (UP, 2)],
        [(LF, 6), (LF, 3), (LF, 0)],
        [(DN, 8), (DN, 7), (DN, 6)],
        [(RT, 2), (RT, 5), (RT, 8)],
    ],
    // Top
    [
        [(FR, 0), (FR, 1), (FR, 2)],
        [(LF, 0), (LF, 1), (LF, 2)],
        [(BK, 0), (BK, 1), (BK, 2)],
        [(RT, 0), (RT, 1), (RT, 2)],
    ],
    // Bottom
    [
        [(FR, 6), (FR, 7), (FR, 8)],
        [(RT, 6), (RT, 7), (RT, 8)],
        [(BK, 6), (BK, 7), (BK, 8)],
        [(LF, 6), (LF, 7), (LF, 8)],
    ],
    // Left
    [
        [(FR, 0), (FR, 3), (FR, 6)],
        [(DN, 0), (DN, 3), (DN, 6)],
        [(BK, 8), (BK, 5), (BK, 2)],
        [(UP, 0), (UP, 3), (UP, 6)],
    ],
    // Right
    [
        [(FR, 2), (FR, 5), (FR, 8)],
        [(UP, 2), (UP, 5), (UP, 8)],
        [(BK, 6), (BK, 3), (BK, 0)],
        [(DN, 2), (DN, 5), (DN, 8)],
    ],
];

/// Sticker colors of all six faces.
///
/// Serialized as a flat object keyed by face name; missing faces fall back
/// to their solved color when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "FacesRecord", into = "FacesRecord")]
pub struct Faces {
    stickers: [FaceStickers; FACE_COUNT],
}

impl Faces {
    /// The solved cube: every face uniformly its home color.
    pub fn solved() -> Self {
        let mut stickers = [[Color::White; STICKERS_PER_FACE]; FACE_COUNT];
        for face in Face::ALL {
            stickers[face.index()] = [face.home_color(); STICKERS_PER_FACE];
        }
        Self { stickers }
    }

    /// Build from explicit sticker arrays, in [`Face::ALL`] order.
    pub fn from_stickers(stickers: [FaceStickers; FACE_COUNT]) -> Self {
        Self { stickers }
    }

    pub fn face(&self, face: Face) -> &FaceStickers {
        &self.stickers[face.index()]
    }

    pub fn sticker(&self, face: Face, index: usize) -> Color {
        self.stickers[face.index()][index]
    }

    /// Iterate faces in [`Face::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Face, &FaceStickers)> + '_ {
        Face::ALL.iter().map(move |&f| (f, &self.stickers[f.index()]))
    }

    /// Return a copy with one face turned a quarter turn.
    pub fn rotated(&self, face: Face, direction: Direction) -> Faces {
        let mut next = *self;

        next.stickers[face.index()] = permute_stickers(self.face(face), direction);

        let strips = &ADJACENT[face.index()];
        for (j, src) in strips.iter().enumerate() {
            let dst = match direction {
                Direction::Clockwise => &strips[(j + 1) % 4],
                Direction::CounterClockwise => &strips[(j + 3) % 4],
            };
            for (&(sf, si), &(df, di)) in src.iter().zip(dst.iter()) {
                next.stickers[df.index()][di] = self.stickers[sf.index()][si];
            }
        }

        next
    }

    /// See [`is_solved`].
    pub fn is_solved(&self) -> bool {
        is_solved(self)
    }
}

impl Default for Faces {
    fn default() -> Self {
        Self::solved()
    }
}

/// Permute one face's own stickers a quarter turn.
pub fn permute_stickers(stickers: &FaceStickers, direction: Direction) -> FaceStickers {
    let cycle = match direction {
        Direction::Clockwise => &CW_CYCLE,
        Direction::CounterClockwise => &CCW_CYCLE,
    };
    let mut out = *stickers;
    for (i, &src) in cycle.iter().enumerate() {
        out[i] = stickers[src];
    }
    out
}

/// Turn `face` a quarter turn in `direction`.
pub fn rotate_face(faces: &Faces, face: Face, direction: Direction) -> Faces {
    faces.rotated(face, direction)
}

/// Turn a face given by name (`"front"`, `"top"`, ...).
///
/// An unknown name is a programming error and fails with
/// [`CubeError::InvalidFace`].
pub fn rotate_face_named(
    faces: &Faces,
    name: &str,
    direction: Direction,
) -> Result<Faces, CubeError> {
    let face = Face::from_name(name)?;
    Ok(faces.rotated(face, direction))
}

/// True iff every face is uniform (all 9 stickers equal within the face).
///
/// This is a per-face check; it does not compare colors across faces.
pub fn is_solved(faces: &Faces) -> bool {
    faces
        .stickers
        .iter()
        .all(|face| face.iter().all(|&c| c == face[0]))
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct FacesRecord {
    front: FaceStickers,
    back: FaceStickers,
    top: FaceStickers,
    bottom: FaceStickers,
    left: FaceStickers,
    right: FaceStickers,
}

impl Default for FacesRecord {
    fn default() -> Self {
        Faces::solved().into()
    }
}

impl From<Faces> for FacesRecord {
    fn from(f: Faces) -> Self {
        Self {
            front: *f.face(Face::Front),
            back: *f.face(Face::Back),
            top: *f.face(Face::Top),
            bottom: *f.face(Face::Bottom),
            left: *f.face(Face::Left),
            right: *f.face(Face::Right),
        }
    }
}

impl From<FacesRecord> for Faces {
    fn from(r: FacesRecord) -> Self {
        Faces::from_stickers([r.front, r.back, r.top, r.bottom, r.left, r.right])
    }
}
