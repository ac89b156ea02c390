mod button_row;
mod text_input;

pub use button_row::ButtonRow;
pub use text_input::{TextInput, TextInputEvent};
