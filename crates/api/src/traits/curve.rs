//! Elliptic curve group contracts

use core::fmt::Debug;

use super::field::Field;
use super::scalar::MsmScalar;
use crate::types::GlvParameters;

/// A point in affine coordinates `(x, y)`, or the point at infinity.
pub trait CurveAffine:
    Copy + Clone + Debug + Default + PartialEq + Eq + Send + Sync + 'static
{
    /// Coordinate field
    type Base: Field;

    /// Matching projective representation
    type Projective: CurveProjective<Affine = Self>;

    /// The point at infinity
    fn identity() -> Self;

    /// A fixed generator of the prime-order subgroup
    fn generator() -> Self;

    /// Builds a finite point from coordinates without checking the curve equation
    fn from_xy_unchecked(x: Self::Base, y: Self::Base) -> Self;

    /// x coordinate; unspecified for the identity
    fn x(&self) -> Self::Base;

    /// y coordinate; unspecified for the identity
    fn y(&self) -> Self::Base;

    /// Returns true for the point at infinity
    fn is_identity(&self) -> bool;

    /// Curve equation check, true for the identity
    fn is_on_curve(&self) -> bool;

    /// Returns `-self`
    fn negate(&self) -> Self;

    /// Lift into projective coordinates
    fn to_projective(&self) -> Self::Projective;
}

/// A point in projective coordinates, used for running sums.
pub trait CurveProjective:
    Copy + Clone + Debug + Default + PartialEq + Eq + Send + Sync + 'static
{
    /// Matching affine representation
    type Affine: CurveAffine<Projective = Self>;

    /// The point at infinity
    fn identity() -> Self;

    /// Returns true for the point at infinity
    fn is_identity(&self) -> bool;

    /// Returns `2·self`
    fn double(&self) -> Self;

    /// Complete addition
    fn add(&self, rhs: &Self) -> Self;

    /// Complete mixed addition with an affine point
    fn add_mixed(&self, rhs: &Self::Affine) -> Self;

    /// Returns `-self`
    fn negate(&self) -> Self;

    /// Normalize to affine coordinates
    fn to_affine(&self) -> Self::Affine;

    /// Normalize a batch of points with a single inversion
    fn batch_to_affine(points: &[Self]) -> Vec<Self::Affine> {
        points.iter().map(|p| p.to_affine()).collect()
    }
}

/// An efficiently computable endomorphism acting as scalar multiplication
/// by a fixed eigenvalue `λ` on the prime-order subgroup.
pub trait Endomorphism {
    /// Returns `endo(self)`
    fn endomorphism(&self) -> Self;
}

/// A curve equipped with an endomorphism and the lattice constants needed to
/// split scalars into two half-length parts.
pub trait GlvCurve: CurveAffine + Endomorphism {
    /// Scalar field of the prime-order subgroup
    type Scalar: MsmScalar;

    /// Decomposition constants for this curve
    fn glv_parameters() -> &'static GlvParameters;
}
