use framebus_macros::Payload;

#[derive(Payload)]
#[payload(topic = "chat")]
struct Message;

fn main() {
    let _ = Message;
}
