//! MediaPipe FaceMesh landmark index scheme.
//!
//! The mesh detector returns an ordered point sequence indexed by this fixed,
//! versioned scheme: 468 base points, optionally extended to 478 when the
//! model also emits iris points. Index N always denotes the same anatomical
//! location across every pipeline stage; reordering is forbidden.
//!
//! Side naming follows the subject, not the screen: "right" landmarks belong
//! to the subject's right side, which appears on the LEFT half of an
//! unmirrored photo (smaller x). All index constants below assume that
//! convention.

/// Number of base mesh points. A landmark set is complete at this length.
pub const POINT_COUNT: usize = 468;

/// Number of points when the model also emits the two 5-point iris rings.
pub const POINT_COUNT_WITH_IRIS: usize = 478;

// ── Midline ─────────────────────────────────────────────────────────────────

/// Topmost forehead point of the mesh (trichion stand-in).
pub const FOREHEAD_TOP: usize = 10;
/// Glabella, the midpoint between the eyebrows.
pub const BROW_LINE: usize = 9;
/// Nasion, the bridge of the nose between the eyes.
pub const NOSE_BRIDGE: usize = 168;
/// Tip of the nose.
pub const NOSE_TIP: usize = 1;
/// Subnasale, the base of the nose above the philtrum.
pub const NOSE_BASE: usize = 2;
/// Center of the upper inner lip.
pub const UPPER_LIP_INNER: usize = 13;
/// Center of the lower inner lip.
pub const LOWER_LIP_INNER: usize = 14;
/// Bottom of the lower outer lip.
pub const LIP_BOTTOM: usize = 17;
/// Menton, the bottom of the chin.
pub const CHIN: usize = 152;

// ── Lateral pairs ───────────────────────────────────────────────────────────

/// Zygion stand-ins, the widest points of the face oval.
pub const RIGHT_CHEEK: usize = 234;
pub const LEFT_CHEEK: usize = 454;

/// Gonion stand-ins, the jaw corners.
pub const RIGHT_JAW_CORNER: usize = 58;
pub const LEFT_JAW_CORNER: usize = 288;

/// Upper-temple points used for forehead width.
pub const RIGHT_FOREHEAD: usize = 21;
pub const LEFT_FOREHEAD: usize = 251;

/// Outer nostril edges used for nose width.
pub const RIGHT_NOSE_WING: usize = 98;
pub const LEFT_NOSE_WING: usize = 327;

/// Mouth corners.
pub const RIGHT_MOUTH_CORNER: usize = 61;
pub const LEFT_MOUTH_CORNER: usize = 291;

// ── Eyes ────────────────────────────────────────────────────────────────────

pub const RIGHT_EYE_OUTER: usize = 33;
pub const RIGHT_EYE_INNER: usize = 133;
pub const RIGHT_EYE_UPPER_LID: usize = 159;
pub const RIGHT_EYE_LOWER_LID: usize = 145;

pub const LEFT_EYE_OUTER: usize = 263;
pub const LEFT_EYE_INNER: usize = 362;
pub const LEFT_EYE_UPPER_LID: usize = 386;
pub const LEFT_EYE_LOWER_LID: usize = 374;

/// Full lid contour of the right eye, 16 points. Includes the corner and lid
/// landmarks above; used wherever a whole eye must move as a rigid group.
pub const RIGHT_EYE_RING: &[usize] = &[
    33, 7, 163, 144, 145, 153, 154, 155, 133, 173, 157, 158, 159, 160, 161, 246,
];

/// Full lid contour of the left eye, 16 points.
pub const LEFT_EYE_RING: &[usize] = &[
    263, 249, 390, 373, 374, 380, 381, 382, 362, 398, 384, 385, 386, 387, 388, 466,
];

/// Iris points of the right eye (center first), present only in 478-point sets.
pub const RIGHT_IRIS: &[usize] = &[468, 469, 470, 471, 472];

/// Iris points of the left eye (center first), present only in 478-point sets.
pub const LEFT_IRIS: &[usize] = &[473, 474, 475, 476, 477];
