use crate::float::{is_negligible, Float};

struct Point<T: Float> {
    x: T,
    y: T,
}

fn index<T: Float>(i: usize) -> T {
    T::from_usize(i).unwrap()
}

/// Refine the integer dip position `tau` of `data` to a fractional one.
///
/// A parabola is fitted through `tau` and its two neighbours. At either edge of
/// `data` only one neighbour exists; the lower of the two points wins and a tie
/// keeps `tau`. A flat dip (vanishing curvature) also keeps `tau`.
///
/// The result always lies in `[0, data.len() - 1]`.
pub fn refine_dip<T: Float>(tau: usize, data: &[T]) -> T {
    assert!(tau < data.len());
    let last = data.len() - 1;

    let x0 = if tau < 1 { tau } else { tau - 1 };
    let x2 = if tau < last { tau + 1 } else { tau };

    let refined = if x0 == tau {
        if data[tau] <= data[x2] {
            index(tau)
        } else {
            index(x2)
        }
    } else if x2 == tau {
        if data[tau] <= data[x0] {
            index(tau)
        } else {
            index(x0)
        }
    } else {
        parabola_vertex(
            Point {
                x: index(x0),
                y: data[x0],
            },
            Point {
                x: index(tau),
                y: data[tau],
            },
            Point {
                x: index(x2),
                y: data[x2],
            },
        )
    };

    refined.max(T::zero()).min(index(last))
}

/// Abscissa of the vertex of the parabola through three equally spaced points.
fn parabola_vertex<T: Float>(left: Point<T>, center: Point<T>, right: Point<T>) -> T {
    let two = T::from_f64(2.0).unwrap();
    let denominator = two * (two * center.y - right.y - left.y);
    if is_negligible(denominator) {
        return center.x;
    }
    center.x + (right.y - left.y) / denominator
}
