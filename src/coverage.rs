//! Area coverage of the grid path.
//!
//! Every stripe spans the whole canvas, so a pixel is covered by the union of
//! a set of vertical bands and a set of horizontal bands. With `cx` the
//! covered fraction of its column and `cy` of its row, the covered area of
//! the pixel is `cx + cy - cx * cy`.

use crate::{Orientation, Stripe};

/// Per column and per row coverage of a path.
#[derive(Clone, Debug, PartialEq)]
pub struct Coverage {
    /// Covered fraction of each column.
    pub columns: Vec<f64>,
    /// Covered fraction of each row.
    pub rows: Vec<f64>,
}

impl Coverage {
    /// Computes coverage of `stripes` on a square canvas.
    pub fn new(stripes: &[Stripe], size: u32) -> Coverage {
        Coverage {
            columns: coverage(&intervals(stripes, Orientation::Vertical, size), size),
            rows: coverage(&intervals(stripes, Orientation::Horizontal, size), size),
        }
    }

    /// Gets the covered fraction of pixel `(x, y)`.
    pub fn at(&self, x: u32, y: u32) -> f64 {
        let cx = self.columns[x as usize];
        let cy = self.rows[y as usize];
        cx + cy - cx * cy
    }
}

/// Clips stripes of one orientation to `[0, size]` and merges them into
/// sorted, disjoint intervals.
pub fn intervals(stripes: &[Stripe], orientation: Orientation, size: u32) -> Vec<[f64; 2]> {
    let mut list: Vec<[f64; 2]> = stripes.iter()
        .filter(|s| s.orientation == orientation)
        .filter_map(|s| s.rect(size).clip(size))
        .map(|r| match orientation {
            Orientation::Vertical => [r.x, r.x + r.w],
            Orientation::Horizontal => [r.y, r.y + r.h],
        })
        .collect();
    list.sort_by(|a, b| a[0].total_cmp(&b[0]));

    let mut res: Vec<[f64; 2]> = Vec::with_capacity(list.len());
    for [a, b] in list {
        match res.last_mut() {
            Some(last) if a <= last[1] => last[1] = last[1].max(b),
            _ => res.push([a, b]),
        }
    }
    res
}

/// Integrates disjoint intervals over unit pixel cells `[p, p + 1]`.
pub fn coverage(intervals: &[[f64; 2]], size: u32) -> Vec<f64> {
    let mut res = vec![0.0; size as usize];
    for &[a, b] in intervals {
        let first = a.floor().max(0.0) as usize;
        let last = (b.ceil() as usize).min(res.len());
        for (p, cell) in res.iter_mut().enumerate().take(last).skip(first) {
            let p = p as f64;
            let overlap = b.min(p + 1.0) - a.max(p);
            if overlap > 0.0 {*cell += overlap};
        }
    }
    for cell in &mut res {*cell = cell.min(1.0)}
    res
}
