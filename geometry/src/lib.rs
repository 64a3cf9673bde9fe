//! Screen-space geometry shared by every node.
//!
//! Nodes compare window rectangles in the desktop's screen space and publish
//! where their mesh appears in that same space. This crate holds the pure math
//! for both: the overlap test used to find adjacent peers, and the camera
//! pipeline that takes a 3D world position to a physical pixel.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`rect`] | Window rectangles and the strict overlap test |
//! | [`camera`] | Scene camera and canvas viewport |
//! | [`project`] | World→pixel projection and screen points |
//! | [`consts`] | Camera defaults |

pub mod camera;
pub mod consts;
pub mod project;
pub mod rect;

pub use camera::{Camera, Projection, Viewport};
pub use project::{PixelPoint, Point, mesh_physical_position, project_bounding_box, project_to_pixel_space};
pub use rect::{Rectangle, rectangles_overlap};
