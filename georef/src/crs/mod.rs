//! Coordinate reference system selection.
//!
//! Geographic control points are projected into each candidate CRS, an
//! image → CRS transform is fitted, and the candidate whose fit reproduces
//! its projected points with the smallest RMSE is selected.

mod projector;
mod scorer;
mod table;


pub use projector::{Proj4Projector, Projector};
pub use scorer::{best_score, find_best_crs, CrsScore, CrsScorer};
pub use table::{CrsDefinition, CrsTable};
