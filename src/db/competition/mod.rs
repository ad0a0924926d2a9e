pub(super) mod cup;
mod grouped_cup;
mod template;
