use framebus_core::Payload;
use framebus_macros::Payload;

#[derive(Payload)]
#[payload(name = "input.key_pressed")]
struct KeyPressed {
    code: u32,
}

#[derive(Payload)]
#[payload(name = "scene.changed")]
enum SceneChanged {
    Loaded { id: String },
    Unloaded,
}

#[derive(Payload)]
struct Envelope<T: Send + Sync + 'static> {
    inner: T,
}

fn main() {
    assert_eq!(KeyPressed { code: 13 }.payload_name(), "input.key_pressed");
    assert_eq!(SceneChanged::Unloaded.payload_name(), "scene.changed");
    let _ = SceneChanged::Loaded { id: "menu".into() };
    assert_eq!(Envelope { inner: 1u8 }.payload_name(), "Envelope");
}
