use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{Event, Window};

/// A window event subscription that lasts exactly as long as this value.
pub struct WindowListener {
	window: Window,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl WindowListener {
	/// Subscribe `handler` to `event` on the global window.
	pub fn new(event: &'static str, handler: impl FnMut(Event) + 'static) -> Option<Self> {
		let window = web_sys::window()?;
		let callback = Closure::<dyn FnMut(Event)>::new(handler);
		if let Err(e) =
			window.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
		{
			warn!("could not subscribe to `{}`: {:?}", event, e);
			return None;
		}
		Some(Self {
			window,
			event,
			callback,
		})
	}
}

impl Drop for WindowListener {
	fn drop(&mut self) {
		let _ = self
			.window
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

/// Keeps an animation loop scheduling itself until dropped.
pub struct LoopHandle(Rc<Cell<bool>>);

impl LoopHandle {
	/// A live handle.
	pub fn new() -> Self {
		Self(Rc::new(Cell::new(true)))
	}

	/// Flag the loop polls each frame.
	pub fn alive(&self) -> Rc<Cell<bool>> {
		self.0.clone()
	}
}

impl Default for LoopHandle {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for LoopHandle {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

/// Whether a loop polling `alive` should draw another frame.
///
/// A self-scheduling callback holds a clone of the `slot` it lives in, so
/// once the loop stops the slot is emptied to let both be freed.
pub fn keep_running<T>(alive: &Cell<bool>, slot: &RefCell<Option<T>>) -> bool {
	if alive.get() {
		return true;
	}
	drop(slot.borrow_mut().take());
	false
}

#[cfg(test)]
mod tests {
	use std::rc::Rc;

	use super::*;

	type Frame = Rc<dyn Fn() -> bool>;

	#[test]
	fn dropping_the_handle_stops_the_loop() {
		let frames = LoopHandle::new();
		let alive = frames.alive();
		assert!(alive.get());
		drop(frames);
		assert!(!alive.get());
	}

	#[test]
	fn stopped_loop_frees_its_self_scheduling_callback() {
		let frames = LoopHandle::new();
		let slot: Rc<RefCell<Option<Frame>>> = Rc::new(RefCell::new(None));
		let (inner, alive) = (slot.clone(), frames.alive());
		let frame: Frame = Rc::new(move || keep_running(&alive, &inner));
		*slot.borrow_mut() = Some(frame.clone());
		let cycle = Rc::downgrade(&slot);
		drop(slot);

		assert!(frame());
		assert!(cycle.upgrade().is_some());

		drop(frames);
		assert!(!frame());
		drop(frame);
		assert!(cycle.upgrade().is_none());
	}
}
