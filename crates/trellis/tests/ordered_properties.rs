//! Property tests for the ordered layout engine.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use trellis::{
        geom::{Axis, Edges, Expanse},
        ordered::{Available, OrderedParams, SlotInput, distribute, solve},
        slot::ExpandRatio,
    };

    fn slot_strategy() -> impl Strategy<Value = SlotInput> {
        (0u32..200, 0u32..200, prop::option::of(0.0f64..10.0)).prop_map(|(w, h, ratio)| {
            let mut s = SlotInput::fixed(w, h);
            s.expand_ratio = ratio.map_or(ExpandRatio::NONE, ExpandRatio::new);
            s
        })
    }

    fn params_strategy() -> impl Strategy<Value = (Axis, Edges, u32)> {
        (
            prop::bool::ANY,
            (0u32..20, 0u32..20, 0u32..20, 0u32..20),
            0u32..12,
        )
            .prop_map(|(vertical, (t, r, b, l), spacing)| {
                let axis = if vertical {
                    Axis::Vertical
                } else {
                    Axis::Horizontal
                };
                (axis, Edges::new(t, r, b, l), spacing)
            })
    }

    fn spaced(mut slots: Vec<SlotInput>) -> Vec<SlotInput> {
        for s in slots.iter_mut().skip(1) {
            s.leading_spacer = true;
        }
        slots
    }

    fn natural(axis: Axis, margins: Edges, spacing: u32, slots: &[SlotInput]) -> u32 {
        let extents: u32 = slots.iter().map(|s| s.used_extent(axis)).sum();
        extents + spacing * slots.len().saturating_sub(1) as u32 + margins.along(axis)
    }

    proptest! {
        #[test]
        fn definite_size_is_conserved(
            slots in prop::collection::vec(slot_strategy(), 1..8),
            (axis, margins, spacing) in params_strategy(),
            extra in 0u32..500,
        ) {
            let slots = spaced(slots);
            let available = natural(axis, margins, spacing, &slots) + extra;
            let params = OrderedParams {
                axis,
                width: Available::Definite(available),
                height: Available::Definite(available),
                margins,
                spacing,
            };
            let out = solve(&params, &slots);
            let used: u32 = out.slots.iter().map(|g| g.cell.extent(axis)).sum::<u32>()
                + spacing * (slots.len() as u32 - 1)
                + margins.along(axis);
            prop_assert_eq!(used, available);
            let last = out.slots.last().map(|g| g.cell.end(axis)).unwrap_or_default();
            prop_assert_eq!(last + margins.trailing(axis), available);
        }

        #[test]
        fn shrink_to_fit_is_idempotent(
            slots in prop::collection::vec(slot_strategy(), 0..8),
            (axis, margins, spacing) in params_strategy(),
        ) {
            let slots = spaced(slots);
            let undefined = OrderedParams {
                axis,
                width: Available::Undefined,
                height: Available::Undefined,
                margins,
                spacing,
            };
            let first = solve(&undefined, &slots);
            prop_assert_eq!(first.size.on(axis), natural(axis, margins, spacing, &slots));
            let definite = OrderedParams {
                width: Available::Definite(first.size.w),
                height: Available::Definite(first.size.h),
                ..undefined
            };
            let second = solve(&definite, &slots);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(solve(&definite, &slots), second);
        }

        #[test]
        fn shares_follow_expand_ratios(
            remaining in 0u32..2000,
            weights in prop::collection::vec(0.1f64..10.0, 1..8),
        ) {
            let shares = distribute(remaining, &weights);
            let total: f64 = weights.iter().sum();
            prop_assert_eq!(shares.iter().sum::<u32>(), remaining);
            for (share, w) in shares.iter().zip(&weights) {
                let exact = f64::from(remaining) * w / total;
                prop_assert!((f64::from(*share) - exact).abs() <= 1.0);
            }
        }

        #[test]
        fn no_ratio_means_equal_shares(
            sizes in prop::collection::vec((0u32..100, 0u32..100), 1..8),
            extra in 0u32..1000,
        ) {
            let slots: Vec<SlotInput> = sizes.iter().map(|(w, h)| SlotInput::fixed(*w, *h)).collect();
            let base: u32 = sizes.iter().map(|(_, h)| h).sum();
            let params = OrderedParams {
                axis: Axis::Vertical,
                width: Available::Undefined,
                height: Available::Definite(base + extra),
                margins: Edges::ZERO,
                spacing: 0,
            };
            let out = solve(&params, &slots);
            let shares: Vec<u32> = out
                .slots
                .iter()
                .zip(&sizes)
                .map(|(g, (_, h))| g.cell.h - h)
                .collect();
            let min = shares.iter().min().copied().unwrap_or_default();
            let max = shares.iter().max().copied().unwrap_or_default();
            prop_assert!(max - min <= 1);
            prop_assert_eq!(shares.iter().sum::<u32>(), extra);
            // Leftover pixels go to earlier slots.
            prop_assert!(shares.windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn zero_slots_report_margins() {
        let params = OrderedParams {
            axis: Axis::Horizontal,
            width: Available::Undefined,
            height: Available::Undefined,
            margins: Edges::new(1, 2, 3, 4),
            spacing: 10,
        };
        assert_eq!(solve(&params, &[]).size, Expanse::new(6, 4));
    }
}
