//! `transform` attribute grammar.
//!
//! Functions compose left to right: each one is post-multiplied into the
//! accumulated matrix, so the rightmost function is applied to points first.

use kurbo::Affine;

use crate::error::{ParseError, Result};
use crate::scanner::TextScanner;

/// Parse a transform list such as `translate(10,0) rotate(45 5 5)`.
///
/// An empty list is the identity. Unknown function names, missing
/// arguments and unterminated argument lists are errors.
#[must_use = "parsing result should be used"]
pub fn parse_transform(value: &str) -> Result<Affine> {
    let mut s = TextScanner::new(value);
    let mut matrix = Affine::IDENTITY;
    let fail = |reason: &str| ParseError::Transform {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    while !s.empty() {
        let Some(name) = s.next_function() else {
            return Err(fail(&format!("expected a transform function at {:?}", s.ahead())));
        };
        s.skip_whitespace();

        let f = match name {
            "matrix" => {
                let a = args::<6>(&mut s).ok_or_else(|| fail("matrix needs 6 numbers"))?;
                Affine::new(a.map(f64::from))
            }
            "translate" => {
                let tx = first(&mut s).ok_or_else(|| fail("translate needs a number"))?;
                let ty = s.check_for_float().unwrap_or(0.0);
                Affine::translate((f64::from(tx), f64::from(ty)))
            }
            "scale" => {
                let sx = first(&mut s).ok_or_else(|| fail("scale needs a number"))?;
                let sy = s.check_for_float().unwrap_or(sx);
                Affine::scale_non_uniform(f64::from(sx), f64::from(sy))
            }
            "rotate" => {
                let angle = first(&mut s).ok_or_else(|| fail("rotate needs an angle"))?;
                let rotation = Affine::rotate(f64::from(angle).to_radians());
                match s.check_for_float() {
                    None => rotation,
                    Some(cx) => {
                        let cy = s
                            .check_for_float()
                            .ok_or_else(|| fail("rotate centre needs both cx and cy"))?;
                        let centre = (f64::from(cx), f64::from(cy));
                        Affine::translate(centre)
                            * rotation
                            * Affine::translate((-centre.0, -centre.1))
                    }
                }
            }
            "skewX" => {
                let a = first(&mut s).ok_or_else(|| fail("skewX needs an angle"))?;
                Affine::skew(f64::from(a).to_radians().tan(), 0.0)
            }
            "skewY" => {
                let a = first(&mut s).ok_or_else(|| fail("skewY needs an angle"))?;
                Affine::skew(0.0, f64::from(a).to_radians().tan())
            }
            other => return Err(fail(&format!("unknown transform function {other:?}"))),
        };

        s.skip_whitespace();
        if !s.consume(b')') {
            return Err(fail(&format!("expected ')' at {:?}", s.ahead())));
        }
        matrix = matrix * f;
        s.skip_comma_whitespace();
    }
    Ok(matrix)
}

fn first(s: &mut TextScanner) -> Option<f32> {
    let v = s.next_float();
    (!v.is_nan()).then_some(v)
}

fn args<const N: usize>(s: &mut TextScanner) -> Option<[f32; N]> {
    let mut out = [0.0; N];
    out[0] = first(s)?;
    for slot in out.iter_mut().skip(1) {
        *slot = s.check_for_float()?;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn apply(t: &str, x: f64, y: f64) -> Point {
        parse_transform(t).unwrap() * Point::new(x, y)
    }

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn empty_list_is_identity() {
        assert_eq!(parse_transform("").unwrap(), Affine::IDENTITY);
        assert_eq!(parse_transform("  ").unwrap(), Affine::IDENTITY);
    }

    #[test]
    fn rightmost_function_applies_first() {
        // scale, then translate
        assert!(close(apply("translate(10,0) scale(2)", 1.0, 1.0), Point::new(12.0, 2.0)));
        // translate, then scale
        assert!(close(apply("scale(2) translate(10,0)", 1.0, 1.0), Point::new(22.0, 2.0)));
    }

    #[test]
    fn optional_arguments() {
        assert!(close(apply("translate(5)", 0.0, 0.0), Point::new(5.0, 0.0)));
        assert!(close(apply("scale(3)", 1.0, 2.0), Point::new(3.0, 6.0)));
        assert!(close(apply("scale(3 ,1)", 1.0, 2.0), Point::new(3.0, 2.0)));
    }

    #[test]
    fn rotate_about_centre() {
        let p = apply("rotate(90 10 10)", 20.0, 10.0);
        assert!(close(p, Point::new(10.0, 20.0)), "{p:?}");
    }

    #[test]
    fn rotate_with_lone_centre_is_error() {
        assert!(parse_transform("rotate(90 10)").is_err());
    }

    #[test]
    fn matrix_and_skew() {
        let m = parse_transform("matrix(1 0 0 1 7 -3)").unwrap();
        assert_eq!(m, Affine::new([1.0, 0.0, 0.0, 1.0, 7.0, -3.0]));
        let p = apply("skewX(45)", 0.0, 10.0);
        assert!(close(p, Point::new(10.0, 10.0)), "{p:?}");
        let p = apply("skewY(45)", 10.0, 0.0);
        assert!(close(p, Point::new(10.0, 10.0)), "{p:?}");
    }

    #[test]
    fn malformed_lists_are_errors() {
        assert!(parse_transform("spin(3)").is_err());
        assert!(parse_transform("translate(1,2").is_err());
        assert!(parse_transform("matrix(1 2 3)").is_err());
        assert!(parse_transform("scale()").is_err());
    }

    #[test]
    fn comma_separated_functions() {
        assert!(close(apply("translate(1,1),translate(2,2)", 0.0, 0.0), Point::new(3.0, 3.0)));
    }
}
