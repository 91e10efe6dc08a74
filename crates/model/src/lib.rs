pub mod message;
pub mod point;
pub mod record;
pub mod route;
pub mod trip;

pub trait ExampleData {
    fn example_data() -> Self;
}
