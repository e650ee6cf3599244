mod register_for_event;

pub use register_for_event::{
    list_registrations, register_for_event, EventRegistrationRequest, COLOR_EVENT_REGISTRATION,
};
