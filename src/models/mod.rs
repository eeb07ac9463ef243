pub mod booking;
pub mod bus;
pub mod loose;
pub mod seat;
pub mod session;
pub mod trip;

pub use booking::{Booking, BookingStatus, Cancellation, FrozenSeat, GuestBooking, SeatHolder, TripRecords};
pub use bus::{Bus, Schedule};
pub use seat::{SeatSet, SeatStatus, SeatStatusMap};
pub use session::{Action, Module, Permissions, Role, Session, SessionUser};
pub use trip::{TripRef, TripSelector};
