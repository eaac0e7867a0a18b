use super::LayoutSystem;
use crate::layout_engine::{LayoutInput, LayoutParams};
use crate::model::ClientKey;
use crate::sys::geometry::Rect;

/// Master column on the left, stack column on the right.
#[derive(Debug, Default, Clone, Copy)]
pub struct TileLayoutSystem;

impl LayoutSystem for TileLayoutSystem {
    fn symbol(&self, _visible: usize) -> String { "[]=".to_string() }

    fn arrange(&self, params: &LayoutParams, clients: &[LayoutInput]) -> Vec<(ClientKey, Rect)> {
        let area = params.usable;
        let n = clients.len() as i32;
        let nmaster = params.master_count.min(i32::MAX as u32) as i32;
        if n == 0 {
            return Vec::new();
        }

        let master_width = if n > nmaster {
            if nmaster > 0 {
                (area.width as f64 * params.master_factor) as i32
            } else {
                0
            }
        } else {
            area.width
        };

        let mut placements = Vec::with_capacity(clients.len());
        let (mut my, mut ty) = (0, 0);
        for (i, client) in clients.iter().enumerate() {
            let i = i as i32;
            let geometry = if i < nmaster {
                let h = (area.height - my) / (n.min(nmaster) - i);
                my += h;
                Rect::new(area.x, area.y + my - h, master_width, h)
            } else {
                let h = (area.height - ty) / (n - i);
                ty += h;
                Rect::new(area.x + master_width, area.y + ty - h, area.width - master_width, h)
            };
            placements.push((client.key, geometry));
        }
        placements
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use slotmap::SlotMap;

    use super::*;

    fn run(n: usize, master_count: u32, usable: Rect) -> Vec<Rect> {
        let mut keys: SlotMap<ClientKey, ()> = SlotMap::with_key();
        let clients: Vec<_> = (0..n)
            .map(|_| LayoutInput {
                key: keys.insert(()),
                geometry: Rect::default(),
                floating: false,
                fullscreen: false,
            })
            .collect();
        let params = LayoutParams {
            monitor: Rect::new(0, 0, 1920, 1080),
            usable,
            master_factor: 0.55,
            master_count,
        };
        TileLayoutSystem.arrange(&params, &clients).into_iter().map(|(_, r)| r).collect()
    }

    #[test]
    fn single_client_fills_the_area() {
        let usable = Rect::new(0, 30, 1920, 1050);
        assert_eq!(run(1, 1, usable), vec![usable]);
    }

    #[test]
    fn master_and_stack() {
        let usable = Rect::new(0, 0, 1000, 900);
        assert_eq!(
            run(3, 1, usable),
            vec![
                Rect::new(0, 0, 550, 900),
                Rect::new(550, 0, 450, 450),
                Rect::new(550, 450, 450, 450),
            ]
        );
    }

    #[test]
    fn uneven_heights_fill_the_column() {
        let usable = Rect::new(0, 0, 1000, 1000);
        let rects = run(4, 1, usable);
        assert_eq!(rects[1], Rect::new(550, 0, 450, 333));
        assert_eq!(rects[2], Rect::new(550, 333, 450, 333));
        assert_eq!(rects[3], Rect::new(550, 666, 450, 334));
    }

    #[test]
    fn zero_masters_gives_the_stack_everything() {
        let usable = Rect::new(0, 0, 1000, 800);
        assert_eq!(
            run(2, 0, usable),
            vec![Rect::new(0, 0, 1000, 400), Rect::new(0, 400, 1000, 400)]
        );
    }

    #[test]
    fn masters_only_use_full_width() {
        let usable = Rect::new(10, 10, 1000, 800);
        assert_eq!(
            run(2, 2, usable),
            vec![Rect::new(10, 10, 1000, 400), Rect::new(10, 410, 1000, 400)]
        );
    }

    #[test]
    fn empty_input() {
        assert!(run(0, 1, Rect::new(0, 0, 100, 100)).is_empty());
    }
}
