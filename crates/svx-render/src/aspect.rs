//! `preserveAspectRatio`: mapping a viewBox into a viewport.

use kurbo::Affine;
use svx_core::values::{Align, MeetOrSlice};
use svx_core::{Bounds, PreserveAspectRatio};

/// Transform that maps `view_box` onto `viewport`.
///
/// `none` scales each axis independently. Otherwise one uniform scale is
/// chosen (the smaller for `meet`, the larger for `slice`) and the scaled
/// box is aligned inside the viewport per the alignment keyword.
pub fn view_box_transform(viewport: &Bounds, view_box: &Bounds, aspect: PreserveAspectRatio) -> Affine {
    let to_viewport = Affine::translate((f64::from(viewport.min_x), f64::from(viewport.min_y)));
    if view_box.width <= 0.0 || view_box.height <= 0.0 {
        return to_viewport;
    }

    let sx = viewport.width / view_box.width;
    let sy = viewport.height / view_box.height;
    let from_view_box = Affine::translate((-f64::from(view_box.min_x), -f64::from(view_box.min_y)));

    if aspect.align == Align::None {
        return to_viewport * Affine::scale_non_uniform(f64::from(sx), f64::from(sy)) * from_view_box;
    }

    let scale = match aspect.scale {
        MeetOrSlice::Slice => sx.max(sy),
        MeetOrSlice::Meet => sx.min(sy),
    };
    // viewport extent measured in viewBox units
    let image_w = viewport.width / scale;
    let image_h = viewport.height / scale;

    let (x_align, y_align) = alignment_factors(aspect.align);
    let x_offset = (view_box.width - image_w) * x_align;
    let y_offset = (view_box.height - image_h) * y_align;

    to_viewport
        * Affine::scale(f64::from(scale))
        * Affine::translate((-f64::from(x_offset), -f64::from(y_offset)))
        * from_view_box
}

/// Fraction of the slack placed before the content on each axis.
fn alignment_factors(align: Align) -> (f32, f32) {
    let x = match align {
        Align::XMidYMin | Align::XMidYMid | Align::XMidYMax => 0.5,
        Align::XMaxYMin | Align::XMaxYMid | Align::XMaxYMax => 1.0,
        _ => 0.0,
    };
    let y = match align {
        Align::XMinYMid | Align::XMidYMid | Align::XMaxYMid => 0.5,
        Align::XMinYMax | Align::XMidYMax | Align::XMaxYMax => 1.0,
        _ => 0.0,
    };
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn map(t: Affine, x: f64, y: f64) -> (f64, f64) {
        let p = t * Point::new(x, y);
        ((p.x * 1000.0).round() / 1000.0, (p.y * 1000.0).round() / 1000.0)
    }

    #[test]
    fn stretch_scales_axes_independently() {
        let t = view_box_transform(
            &Bounds::new(0.0, 0.0, 200.0, 100.0),
            &Bounds::new(10.0, 10.0, 10.0, 10.0),
            PreserveAspectRatio::STRETCH,
        );
        assert_eq!(map(t, 10.0, 10.0), (0.0, 0.0));
        assert_eq!(map(t, 20.0, 20.0), (200.0, 100.0));
    }

    #[test]
    fn meet_centres_with_letterbox() {
        let t = view_box_transform(
            &Bounds::new(0.0, 0.0, 200.0, 100.0),
            &Bounds::new(0.0, 0.0, 10.0, 10.0),
            PreserveAspectRatio::LETTERBOX,
        );
        assert_eq!(map(t, 0.0, 0.0), (50.0, 0.0));
        assert_eq!(map(t, 10.0, 10.0), (150.0, 100.0));
    }

    #[test]
    fn slice_fills_and_aligns_end() {
        let aspect = PreserveAspectRatio::new(Align::XMaxYMax, MeetOrSlice::Slice);
        let t = view_box_transform(
            &Bounds::new(0.0, 0.0, 200.0, 100.0),
            &Bounds::new(0.0, 0.0, 10.0, 10.0),
            aspect,
        );
        // scale 20: the 200px tall image overflows by 100px at the top
        assert_eq!(map(t, 0.0, 0.0), (0.0, -100.0));
        assert_eq!(map(t, 10.0, 10.0), (200.0, 100.0));
    }

    #[test]
    fn min_alignment_and_viewport_offset() {
        let t = view_box_transform(
            &Bounds::new(5.0, 5.0, 100.0, 50.0),
            &Bounds::new(0.0, 0.0, 10.0, 10.0),
            PreserveAspectRatio::START,
        );
        assert_eq!(map(t, 0.0, 0.0), (5.0, 5.0));
        assert_eq!(map(t, 10.0, 10.0), (55.0, 55.0));
    }

    #[test]
    fn empty_view_box_only_translates() {
        let t = view_box_transform(
            &Bounds::new(3.0, 4.0, 100.0, 50.0),
            &Bounds::new(0.0, 0.0, 0.0, 10.0),
            PreserveAspectRatio::LETTERBOX,
        );
        assert_eq!(map(t, 1.0, 1.0), (4.0, 5.0));
    }
}
