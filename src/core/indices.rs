//! Normalized difference indices on Level-2A reflectance bands
//!
//! Bands arrive as scaled digital numbers and are divided by [`GAIN`] before
//! any arithmetic. A zero denominator is not special-cased: `0.0 / 0.0`
//! yields NaN, and every later comparison against a NaN evaluates to false.

use crate::types::{BandRaster, BurnError, BurnResult, IndexArray, SceneBands};
use ndarray::{Array2, ArrayView2, Zip};
use num_traits::AsPrimitive;

/// Digital number to surface reflectance scale factor
pub const GAIN: f64 = 10000.0;

#[inline]
pub fn to_reflectance<T: AsPrimitive<f64>>(dn: T) -> f64 {
    dn.as_() / GAIN
}

/// `(a - b) / (a + b)` on reflectance values
#[inline]
pub fn normalized_difference_pixel<T: AsPrimitive<f64>>(a: T, b: T) -> f64 {
    let a = to_reflectance(a);
    let b = to_reflectance(b);
    (a - b) / (a + b)
}

/// Per-pixel normalized difference of two equally shaped bands
pub fn normalized_difference<T>(a: ArrayView2<T>, b: ArrayView2<T>) -> BurnResult<IndexArray>
where
    T: AsPrimitive<f64> + Send + Sync,
{
    check_same_dim("band_b", a.dim(), b.dim())?;

    let mut index = Array2::<f64>::zeros(a.dim());
    let zip = Zip::from(&mut index).and(a).and(b);

    #[cfg(feature = "parallel")]
    zip.par_for_each(|out, &x, &y| *out = normalized_difference_pixel(x, y));
    #[cfg(not(feature = "parallel"))]
    zip.for_each(|out, &x, &y| *out = normalized_difference_pixel(x, y));

    Ok(index)
}

/// NDVI = (B08 - B04) / (B08 + B04)
pub fn ndvi(b08: &BandRaster, b04: &BandRaster) -> BurnResult<IndexArray> {
    normalized_difference(b08.view(), b04.view())
}

/// NDWI2 = (B08 - B11) / (B08 + B11)
pub fn ndwi2(b08: &BandRaster, b11: &BandRaster) -> BurnResult<IndexArray> {
    normalized_difference(b08.view(), b11.view())
}

/// `post - pre`, NaN wherever either side is NaN
pub fn index_delta(pre: &IndexArray, post: &IndexArray) -> BurnResult<IndexArray> {
    check_same_dim("post index", pre.dim(), post.dim())?;
    Ok(post - pre)
}

/// Temporal change in NDVI between two acquisitions
pub fn ndvi_delta(pre: &SceneBands, post: &SceneBands) -> BurnResult<IndexArray> {
    let pre_ndvi = ndvi(&pre.b08, &pre.b04)?;
    let post_ndvi = ndvi(&post.b08, &post.b04)?;
    index_delta(&pre_ndvi, &post_ndvi)
}

/// Temporal change in NDWI2 between two acquisitions
pub fn ndwi2_delta(pre: &SceneBands, post: &SceneBands) -> BurnResult<IndexArray> {
    let pre_ndwi2 = ndwi2(&pre.b08, &pre.b11)?;
    let post_ndwi2 = ndwi2(&post.b08, &post.b11)?;
    index_delta(&pre_ndwi2, &post_ndwi2)
}

fn check_same_dim(
    band: &str,
    expected: (usize, usize),
    found: (usize, usize),
) -> BurnResult<()> {
    if expected != found {
        return Err(BurnError::InvalidInputShape {
            band: band.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_reflectance_scaling() {
        assert_relative_eq!(to_reflectance(10000u16), 1.0);
        assert_relative_eq!(to_reflectance(2500u16), 0.25);
    }

    #[test]
    fn test_ndvi_values() {
        let b08: BandRaster = array![[3000, 1300], [1000, 0]];
        let b04: BandRaster = array![[1000, 700], [1000, 500]];
        let index = ndvi(&b08, &b04).unwrap();

        assert_relative_eq!(index[[0, 0]], 0.5, epsilon = 1e-12);
        assert_relative_eq!(index[[0, 1]], 0.3, epsilon = 1e-12);
        assert_relative_eq!(index[[1, 0]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(index[[1, 1]], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_denominator_is_nan() {
        let b08: BandRaster = array![[0, 1000]];
        let b11: BandRaster = array![[0, 0]];
        let index = ndwi2(&b08, &b11).unwrap();

        assert!(index[[0, 0]].is_nan());
        assert_relative_eq!(index[[0, 1]], 1.0);
    }

    #[test]
    fn test_delta_propagates_nan() {
        let pre = array![[0.1, f64::NAN]];
        let post = array![[0.4, 0.2]];
        let delta = index_delta(&pre, &post).unwrap();

        assert_relative_eq!(delta[[0, 0]], 0.3, epsilon = 1e-12);
        assert!(delta[[0, 1]].is_nan());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let b08 = BandRaster::zeros((2, 3));
        let b04 = BandRaster::zeros((3, 2));
        match ndvi(&b08, &b04) {
            Err(BurnError::InvalidInputShape { expected, found, .. }) => {
                assert_eq!(expected, (2, 3));
                assert_eq!(found, (3, 2));
            }
            other => panic!("expected shape error, got {:?}", other),
        }
    }
}
