use slotmap::new_key_type;

new_key_type! {
    /// Stable handle for a widget, assigned the first time the coordinator
    /// sees its connector id.
    pub struct WidgetId;

    /// Handle for a slot inside one container's slot arena.
    pub struct SlotId;
}
