//! Physical data model
//!
//! This module holds everything that describes WHAT is simulated, with no
//! knowledge of HOW it is stepped forward in time:
//!
//! - **Field**: the scalar quantity sampled on a uniform 2D grid
//! - **Equation type and parameters**: heat (`alpha`, `dt`) or wave (`c`, `dt`),
//!   including the stability bound of the explicit scheme
//! - **Initial conditions**: profiles that produce a starting field
//!
//! # Example
//!
//! ```rust
//! use pde_rs::physics::{EquationParameters, EquationType, InitialCondition, Spacing};
//!
//! let params = EquationParameters::from_named(EquationType::Wave, &[("c", 1.0), ("dt", 0.05)]).unwrap();
//! params.check_stability(Spacing::default()).unwrap();
//!
//! let u0 = InitialCondition::gaussian_pulse((30.0, 30.0), 5.0, 2.0)
//!     .generate((60, 60))
//!     .unwrap();
//! assert_eq!(u0.shape(), (60, 60));
//! ```

// module declaration
pub mod equation;
pub mod field;
pub mod initial;

// re-export commonly used types for convenience
pub use equation::{EquationParameters, EquationType};
pub use field::{Field, Spacing};
pub use initial::{InitialCondition, PointSource, WaveDirection};
