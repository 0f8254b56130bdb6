use framebus_core::Payload;
use framebus_macros::Payload;

#[derive(Payload)]
struct Ping;

#[derive(Payload)]
struct Moved {
    x: i32,
    y: i32,
}

#[derive(Payload)]
struct Score(u64);

fn main() {
    assert_eq!(Ping.payload_name(), "Ping");
    assert_eq!(Moved { x: 1, y: 2 }.payload_name(), "Moved");
    assert_eq!(Score(3).payload_name(), "Score");

    // 可作为 trait 对象使用
    let boxed: Box<dyn Payload> = Box::new(Ping);
    assert_eq!(boxed.payload_name(), "Ping");
}
