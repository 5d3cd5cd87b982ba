//! A 1D Galerkin projection toolkit.
//!
//! The crate revolves around three abstractions:
//!
//! * [Function]: a callable with an explicit domain of definition, an
//!   optional region of nonzero support, and pre-attached derivative
//!   handles.
//! * [Base]: an ordered set of [Fraction]s (scalar or vectorial
//!   functions) used as approximation or test bases, optionally shared
//!   through a [BaseRegistry].
//! * [EvalData]: sampled results over coordinate axes, with
//!   interpolation and point-wise algebra.
//!
//! On top of these sit L2 scalar products and Gram matrices
//! ([dot_product_l2], [calculate_scalar_product_matrix]), weight
//! computation and change of base ([project_on_base],
//! [change_projection_base], [normalize_base]), first-order nodal bases
//! ([cure_interval]), adaptive quadrature over finite and infinite
//! intervals ([integrate]), and grid-seeded root finding for
//! characteristic equations ([find_roots], [find_roots_complex]).
//!
//! ```
//! use galerkin_1d::{cure_interval, project_on_base, back_project_from_base, Interval};
//! use galerkin_1d::{Function, Handle, Domain};
//!
//! let (_, base) = cure_interval(Interval::new(0.0, 1.0), 11).unwrap();
//! let target = Function::with(
//!     Handle::scalar(|x| 2.0 * x),
//!     Domain::from_bounds(0.0, 1.0),
//!     None,
//!     vec![],
//! ).unwrap();
//!
//! let weights = project_on_base(&target, &base).unwrap();
//! let approx = back_project_from_base(weights.as_slice(), &base).unwrap();
//! assert!((approx.call(0.5).unwrap() - 1.0).abs() < 1e-6);
//! ```

pub mod base;
pub mod domain;
pub mod errors;
pub mod eval_data;
pub mod function;
pub mod integration;
pub mod lagrange;
pub mod product;
pub mod projection;
pub mod registry;
pub mod roots;

pub use base::Base;
pub use domain::{domain_intersection, linspace, Domain, Interval};
pub use errors::{CoreError, ErrorKind};
pub use eval_data::EvalData;
pub use function::{Fraction, Function, Handle};
pub use integration::{gauss_quadrature_points, integrate};
pub use lagrange::{cure_interval, lagrange_first_order};
pub use product::{calculate_scalar_product_matrix, dot_product_l2, fraction_dot_product_l2};
pub use projection::{
    back_project_from_base, change_projection_base, normalize_base, project_on_base,
};
pub use registry::BaseRegistry;
pub use roots::{find_roots, find_roots_complex, find_roots_nd, real};
