/// Turns pointer down/move/up events into horizontal and vertical deltas.
///
/// Event wiring stays with the caller; this only tracks whether a drag is in
/// progress and where the pointer was last seen.
pub struct PointerDragController<H, V>
where
    H: FnMut(f64),
    V: FnMut(f64),
{
    on_horizontal: H,
    on_vertical: V,
    last: Option<(f64, f64)>,
}

impl<H, V> PointerDragController<H, V>
where
    H: FnMut(f64),
    V: FnMut(f64),
{
    pub fn new(on_horizontal: H, on_vertical: V) -> Self {
        Self {
            on_horizontal,
            on_vertical,
            last: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.last = Some((x, y));
    }

    /// Reports the movement since the previous event. Ignored unless dragging.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let Some((last_x, last_y)) = self.last else {
            return;
        };
        let (dx, dy) = (x - last_x, y - last_y);
        if dx != 0.0 {
            (self.on_horizontal)(dx);
        }
        if dy != 0.0 {
            (self.on_vertical)(dy);
        }
        self.last = Some((x, y));
    }

    pub fn pointer_up(&mut self) {
        self.last = None;
    }
}
