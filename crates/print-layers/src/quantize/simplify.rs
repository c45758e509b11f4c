//! Spatial cleanup of label maps.
//!
//! Photographs quantize into speckle that cannot be carved into a block.
//! Two passes reduce it: a majority (mode) filter, then absorption of tiny
//! 4-connected regions into their dominant neighbour.

use crate::raster::LabelMap;

/// Apply cleanup of the given strength (0-100) in place.
///
/// The mode filter radius is `round(strength / 25)`; regions smaller than
/// `round(strength / 100 * 0.005 * pixels)` are merged away.
pub fn simplify_labels(labels: &mut LabelMap, palette_len: usize, strength: u8) {
    if strength == 0 {
        return;
    }
    let strength = strength.min(100) as f64;

    let radius = (strength / 25.0).round() as usize;
    mode_filter(labels, palette_len, radius);

    let min_size = (strength / 100.0 * 0.005 * labels.len() as f64).round() as usize;
    merge_small_regions(labels, palette_len, min_size);
}

/// Replace each label by the most common label in its
/// `(2 * radius + 1)^2` window. The current label wins ties.
pub(crate) fn mode_filter(labels: &mut LabelMap, palette_len: usize, radius: usize) {
    if radius == 0 {
        return;
    }
    let (width, height) = labels.dimensions();
    let source = labels.labels().to_vec();
    let out = labels.labels_mut();
    let mut counts = vec![0u32; palette_len.max(1)];

    for y in 0..height {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius).min(height - 1);
        for x in 0..width {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius).min(width - 1);

            counts.iter_mut().for_each(|c| *c = 0);
            for ny in y0..=y1 {
                for &label in &source[ny * width + x0..=ny * width + x1] {
                    if let Some(c) = counts.get_mut(label as usize) {
                        *c += 1;
                    }
                }
            }

            let current = source[y * width + x];
            let mut best = current;
            let mut best_count = counts.get(current as usize).copied().unwrap_or(0);
            for (label, &count) in counts.iter().enumerate() {
                if count > best_count {
                    best_count = count;
                    best = label as u8;
                }
            }
            out[y * width + x] = best;
        }
    }
}

/// Relabel every 4-connected region smaller than `min_size` pixels with
/// the label most common along its border.
pub(crate) fn merge_small_regions(labels: &mut LabelMap, palette_len: usize, min_size: usize) {
    if min_size <= 1 {
        return;
    }
    let (width, height) = labels.dimensions();
    let total = width * height;
    let data = labels.labels_mut();

    // Pass 1: flood-fill component ids. Each component's pixels end up
    // contiguous in `queue`, delimited by `starts`.
    let mut component = vec![usize::MAX; total];
    let mut queue: Vec<usize> = Vec::with_capacity(total);
    let mut starts: Vec<usize> = Vec::new();

    for seed in 0..total {
        if component[seed] != usize::MAX {
            continue;
        }
        let id = starts.len();
        let label = data[seed];
        starts.push(queue.len());
        let mut head = queue.len();
        queue.push(seed);
        component[seed] = id;

        while head < queue.len() {
            let px = queue[head];
            head += 1;
            for n in neighbours(px, width, height).into_iter().flatten() {
                if component[n] == usize::MAX && data[n] == label {
                    component[n] = id;
                    queue.push(n);
                }
            }
        }
    }
    starts.push(queue.len());

    // Pass 2: absorb small components
    let mut border = vec![0u32; palette_len.max(1)];
    for id in 0..starts.len() - 1 {
        let members = &queue[starts[id]..starts[id + 1]];
        if members.len() >= min_size {
            continue;
        }

        border.iter_mut().for_each(|c| *c = 0);
        for &px in members {
            for n in neighbours(px, width, height).into_iter().flatten() {
                if component[n] != id {
                    if let Some(c) = border.get_mut(data[n] as usize) {
                        *c += 1;
                    }
                }
            }
        }

        let mut best_label = None;
        let mut best_count = 0;
        for (label, &count) in border.iter().enumerate() {
            if count > best_count {
                best_count = count;
                best_label = Some(label as u8);
            }
        }

        if let Some(label) = best_label {
            for &px in members {
                data[px] = label;
            }
        }
    }
}

#[inline]
fn neighbours(px: usize, width: usize, height: usize) -> [Option<usize>; 4] {
    let x = px % width;
    let y = px / width;
    [
        (y > 0).then(|| px - width),
        (y + 1 < height).then(|| px + width),
        (x > 0).then(|| px - 1),
        (x + 1 < width).then(|| px + 1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_filter_removes_isolated_pixel() {
        #[rustfmt::skip]
        let mut map = LabelMap::new(3, 3, vec![
            0, 0, 0,
            0, 1, 0,
            0, 0, 0,
        ]).unwrap();
        mode_filter(&mut map, 2, 1);
        assert_eq!(map.labels(), &[0; 9]);
    }

    #[test]
    fn test_mode_filter_radius_zero_is_noop() {
        let mut map = LabelMap::new(2, 1, vec![0, 1]).unwrap();
        mode_filter(&mut map, 2, 0);
        assert_eq!(map.labels(), &[0, 1]);
    }

    #[test]
    fn test_merge_small_regions() {
        // A 2-pixel island of label 2 inside label 0, and a large label 1 block
        #[rustfmt::skip]
        let mut map = LabelMap::new(4, 3, vec![
            0, 0, 1, 1,
            0, 2, 1, 1,
            0, 2, 1, 1,
        ]).unwrap();
        merge_small_regions(&mut map, 3, 3);
        // Island borders 0 on three sides and 1 on two
        assert_eq!(map.labels(), &[
            0, 0, 1, 1,
            0, 0, 1, 1,
            0, 0, 1, 1,
        ]);
    }

    #[test]
    fn test_simplify_zero_is_noop() {
        let original = LabelMap::new(3, 1, vec![0, 1, 0]).unwrap();
        let mut map = original.clone();
        simplify_labels(&mut map, 2, 0);
        assert_eq!(map, original);
    }
}
