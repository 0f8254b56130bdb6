use framebus_macros::Payload;

#[derive(Payload)]
#[payload(name = "first", name = "second")]
struct Twice;

fn main() {
    let _ = Twice;
}
