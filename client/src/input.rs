//! Raw Bevy input → controller input sources
//!
//! Bevy messages are stamped and forwarded into channels owned by the
//! controller's `InputAttachment`. The attachment itself is a non-send
//! resource, so the controller only ever sees input on the main thread, once
//! per frame and in the order it was collected.

use std::sync::mpsc::{self, Sender};

use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::mouse::MouseMotion;
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow, WindowFocused};
use fps_shared::{
    attach_input, CaptureEvent, FirstPersonController, InputAttachment, InputClock, KeyEvent,
    PointerMotion, Stamped,
};

/// Multiplier applied per `+` / `-` press
const SENSITIVITY_STEP: f64 = 1.25;

/// Sending halves of the controller's input sources
#[derive(Resource)]
pub struct InputFeeds {
    clock: InputClock,
    capture: Sender<Stamped<CaptureEvent>>,
    pointer: Sender<Stamped<PointerMotion>>,
    keys: Sender<Stamped<KeyEvent>>,
}

// A closed channel only means the attachment was detached; nothing left to feed.
impl InputFeeds {
    fn send_capture(&self, event: CaptureEvent) {
        let _ = self.capture.send(self.clock.stamp(event));
    }

    fn send_pointer(&self, motion: PointerMotion) {
        let _ = self.pointer.send(self.clock.stamp(motion));
    }

    fn send_key(&self, event: KeyEvent) {
        let _ = self.keys.send(self.clock.stamp(event));
    }
}

/// Systems that feed raw input into the controller
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectInput;

/// Systems that act on what the controller decided this frame
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplyPointerLock;

pub struct InputBridgePlugin;

impl Plugin for InputBridgePlugin {
    fn build(&self, app: &mut App) {
        let (capture_tx, capture_rx) = mpsc::channel::<Stamped<CaptureEvent>>();
        let (pointer_tx, pointer_rx) = mpsc::channel::<Stamped<PointerMotion>>();
        let (keys_tx, keys_rx) = mpsc::channel::<Stamped<KeyEvent>>();

        let attachment = match attach_input(
            Some(Box::new(capture_rx)),
            Box::new(pointer_rx),
            Box::new(keys_rx),
        ) {
            Ok(attachment) => attachment,
            Err(err) => {
                error!("Input bridge disabled: {err}");
                return;
            }
        };

        app.insert_non_send_resource(attachment);
        app.insert_resource(InputFeeds {
            clock: InputClock::new(),
            capture: capture_tx,
            pointer: pointer_tx,
            keys: keys_tx,
        });

        // ORDER MATTERS: a lock change seen this frame is stamped before this frame's input
        app.add_systems(
            Update,
            (
                report_cursor_grab,
                forward_clicks,
                forward_mouse_motion,
                forward_keyboard,
            )
                .chain()
                .in_set(CollectInput),
        );
        app.add_systems(Update, adjust_look_sensitivity.in_set(CollectInput));
        app.add_systems(
            Update,
            (grab_requested_cursor, release_cursor).in_set(ApplyPointerLock),
        );
        app.add_systems(Last, detach_on_exit);
    }
}

/// Left click is the user gesture that asks for pointer lock
fn forward_clicks(mouse_button: Res<ButtonInput<MouseButton>>, feeds: Res<InputFeeds>) {
    if mouse_button.just_pressed(MouseButton::Left) {
        feeds.send_capture(CaptureEvent::Requested);
    }
}

fn forward_mouse_motion(mut mouse_motion: MessageReader<MouseMotion>, feeds: Res<InputFeeds>) {
    for motion in mouse_motion.read() {
        feeds.send_pointer(PointerMotion {
            delta: motion.delta.as_dvec2(),
        });
    }
}

/// Forward character keys by their layout-dependent text, so Z means Z on AZERTY too
fn forward_keyboard(mut keyboard: MessageReader<KeyboardInput>, feeds: Res<InputFeeds>) {
    for event in keyboard.read() {
        let Key::Character(text) = &event.logical_key else {
            continue;
        };
        let key = text.to_string();
        let event = match event.state {
            ButtonState::Pressed => KeyEvent::Pressed(key),
            ButtonState::Released => KeyEvent::Released(key),
        };
        feeds.send_key(event);
    }
}

/// Report pointer lock changes, whoever made them (us, the OS, the window manager)
fn report_cursor_grab(
    windows: Query<Entity, With<PrimaryWindow>>,
    cursor_opts: Query<&CursorOptions>,
    feeds: Res<InputFeeds>,
    mut was_locked: Local<bool>,
) {
    let Ok(window_entity) = windows.single() else {
        return;
    };
    let Ok(cursor) = cursor_opts.get(window_entity) else {
        return;
    };

    let locked = cursor.grab_mode != CursorGrabMode::None;
    if locked != *was_locked {
        *was_locked = locked;
        feeds.send_capture(CaptureEvent::Changed(locked));
    }
}

/// `+` and `-` retune look sensitivity on the fly
fn adjust_look_sensitivity(
    mut keyboard: MessageReader<KeyboardInput>,
    controller: Option<ResMut<FirstPersonController>>,
) {
    let Some(mut controller) = controller else {
        return;
    };
    for event in keyboard.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        let Key::Character(text) = &event.logical_key else {
            continue;
        };
        let factor = match text.as_str() {
            "+" | "=" => SENSITIVITY_STEP,
            "-" => SENSITIVITY_STEP.recip(),
            _ => continue,
        };
        let sensitivity = controller.look_sensitivity() * factor;
        match controller.set_look_sensitivity(sensitivity) {
            Ok(()) => info!("Look sensitivity: {:.2}", sensitivity),
            Err(err) => warn!("Keeping look sensitivity: {err}"),
        }
    }
}

/// Lock and hide the cursor once the controller has accepted a capture request
fn grab_requested_cursor(
    controller: Option<ResMut<FirstPersonController>>,
    windows: Query<Entity, With<PrimaryWindow>>,
    mut cursor_opts: Query<&mut CursorOptions>,
) {
    let Some(mut controller) = controller else {
        return;
    };
    if !controller.take_capture_request() {
        return;
    }
    let Ok(window_entity) = windows.single() else {
        return;
    };
    if let Ok(mut cursor) = cursor_opts.get_mut(window_entity) {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
    }
}

/// Escape or losing window focus gives the cursor back
fn release_cursor(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut focus_events: MessageReader<WindowFocused>,
    windows: Query<Entity, With<PrimaryWindow>>,
    mut cursor_opts: Query<&mut CursorOptions>,
) {
    let lost_focus = focus_events.read().filter(|event| !event.focused).count() > 0;
    if !lost_focus && !keyboard.just_pressed(KeyCode::Escape) {
        return;
    }
    let Ok(window_entity) = windows.single() else {
        return;
    };
    if let Ok(mut cursor) = cursor_opts.get_mut(window_entity) {
        if cursor.grab_mode != CursorGrabMode::None {
            info!("Releasing cursor");
        }
        cursor.grab_mode = CursorGrabMode::None;
        cursor.visible = true;
    }
}

fn detach_on_exit(
    mut exit: MessageReader<AppExit>,
    attachment: Option<NonSendMut<InputAttachment>>,
) {
    if exit.read().next().is_none() {
        return;
    }
    if let Some(mut attachment) = attachment {
        attachment.detach();
    }
}
