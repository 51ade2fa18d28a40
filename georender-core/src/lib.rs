pub mod affine;
pub mod error;
pub mod geodesic;
pub mod geometry;
pub mod georeferenced_map;
pub mod messages;
pub mod projection;
pub mod viewport;

pub use affine::Affine;
pub use error::GeometryError;
pub use geodesic::{circle, destination, distance, EARTH_RADIUS_M};
pub use geometry::{bbox_to_rectangle, find_centered_bbox, point_in_polygon, Bbox, Point, Rectangle};
pub use georeferenced_map::{Gcp, GeoreferencedMap, ResourceImage};
pub use messages::{MainToWorker, WorkerRequest, WorkerToMain};
pub use projection::{lon_lat_to_web_mercator, web_mercator_to_lon_lat};
pub use viewport::{Viewport, ViewportOptions};
