mod capture;
mod dispatcher;
mod replies;

pub use capture::*;
pub use dispatcher::*;
pub use replies::*;
