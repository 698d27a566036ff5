pub mod booking;
pub mod listing;
pub mod user;

pub use booking::{Booking, BookingStatus, UserBooking};
pub use listing::Listing;
pub use user::User;
