//! Jump target discovery
//!
//! Pattern breaks and pattern loops let playback enter a pattern mid-way.
//! The packer resets its channel memory at those rows so the player never
//! depends on state from rows it skipped.

use crate::{MAX_ROWS, Module, ORDER_END, ORDER_SKIP, effects};

/// Flag every row that a pattern break or pattern loop can jump to
pub fn mark_patterns(module: &mut Module) {
    let mut targets = Vec::new();

    for (order, &pattern) in module.orders.iter().enumerate() {
        if pattern == ORDER_END {
            break;
        }
        if pattern == ORDER_SKIP {
            continue;
        }
        let Some(pattern) = module.patterns.get(pattern as usize) else {
            continue;
        };

        for (row, cells) in pattern.rows().enumerate() {
            for cell in cells {
                match cell.effect {
                    effects::PATTERN_BREAK if cell.param != 0 => {
                        targets.push((order + 1, cell.param as usize));
                    }
                    effects::EXTENDED if cell.param == effects::PARAM_LOOP_START => {
                        targets.push((order, row));
                    }
                    _ => {}
                }
            }
        }
    }

    for (order, row) in targets {
        mark_row(module, order, row);
    }
}

/// Mark `row` of the pattern playing at `order`
///
/// Skip entries are passed over; running off the end of the song wraps
/// to the first order.
fn mark_row(module: &mut Module, mut order: usize, row: usize) {
    if row >= MAX_ROWS {
        return;
    }

    if module.order(order) == ORDER_END {
        order = 0;
    }
    while module.order(order) == ORDER_SKIP {
        order += 1;
    }

    let Some(pattern) = module.pattern_at_order(order) else {
        return;
    };
    module.patterns[pattern].mark_row(row);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pattern, PatternCell};

    fn module_with(orders: Vec<u8>, patterns: usize) -> Module {
        Module {
            orders,
            patterns: vec![Pattern::new(64); patterns],
            ..Module::default()
        }
    }

    fn set_effect(module: &mut Module, pattern: usize, row: usize, effect: u8, param: u8) {
        *module.patterns[pattern].cell_mut(row, 0) = PatternCell {
            effect,
            param,
            ..PatternCell::EMPTY
        };
    }

    fn marked_rows(pattern: &Pattern) -> Vec<usize> {
        (0..pattern.num_rows()).filter(|&r| pattern.marks[r]).collect()
    }

    #[test]
    fn test_pattern_break_marks_next_order() {
        let mut module = module_with(vec![0, 254, 1, 255], 2);
        set_effect(&mut module, 0, 10, effects::PATTERN_BREAK, 16);

        mark_patterns(&mut module);

        assert!(marked_rows(&module.patterns[0]).is_empty());
        assert_eq!(marked_rows(&module.patterns[1]), vec![16]);
    }

    #[test]
    fn test_break_to_row_zero_is_not_a_mark() {
        let mut module = module_with(vec![0, 1], 2);
        set_effect(&mut module, 0, 10, effects::PATTERN_BREAK, 0);

        mark_patterns(&mut module);

        assert!(marked_rows(&module.patterns[1]).is_empty());
    }

    #[test]
    fn test_break_at_song_end_wraps() {
        let mut module = module_with(vec![0, 1, 255], 2);
        set_effect(&mut module, 1, 63, effects::PATTERN_BREAK, 4);

        mark_patterns(&mut module);

        assert_eq!(marked_rows(&module.patterns[0]), vec![4]);
    }

    #[test]
    fn test_loop_start_marks_own_row() {
        let mut module = module_with(vec![0], 1);
        set_effect(&mut module, 0, 8, effects::EXTENDED, effects::PARAM_LOOP_START);
        set_effect(&mut module, 0, 9, effects::EXTENDED, 0xB2);

        mark_patterns(&mut module);

        assert_eq!(marked_rows(&module.patterns[0]), vec![8]);
    }

    #[test]
    fn test_rows_past_pattern_end_are_ignored() {
        let mut module = module_with(vec![0, 1], 2);
        module.patterns[1] = Pattern::new(32);
        set_effect(&mut module, 0, 0, effects::PATTERN_BREAK, 0x40);

        mark_patterns(&mut module);

        assert!(marked_rows(&module.patterns[1]).is_empty());
    }
}
