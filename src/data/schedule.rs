//! Mock appointment schedules
//!
//! Fixed data sets standing in for a scheduling backend. The dashboard
//! picks one by variant index; swapping in a real query layer later only
//! has to honor the same index-to-list lookup.

use serde::Serialize;

/// One appointment row on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct Appointment {
    pub name: &'static str,
    pub age: u8,
    pub sex: &'static str,
    pub time: &'static str,
    pub note: &'static str,
}

/// Number of registered schedule variants
pub const VARIANT_COUNT: usize = 3;

const FULL_DAY: &[Appointment] = &[
    Appointment {
        name: "Sarah Johnson",
        age: 45,
        sex: "F",
        time: "09:00 AM",
        note: "Follow-up: tension headaches",
    },
    Appointment {
        name: "Marcus Webb",
        age: 62,
        sex: "M",
        time: "09:45 AM",
        note: "Blood pressure review",
    },
    Appointment {
        name: "Priya Nair",
        age: 36,
        sex: "F",
        time: "11:10 AM",
        note: "Seasonal allergic rhinitis",
    },
    Appointment {
        name: "Elena Castillo",
        age: 29,
        sex: "F",
        time: "02:30 PM",
        note: "New patient consult",
    },
    Appointment {
        name: "Tom Okafor",
        age: 51,
        sex: "M",
        time: "03:15 PM",
        note: "Lab results discussion",
    },
];

const LIGHT_DAY: &[Appointment] = &[
    Appointment {
        name: "Priya Nair",
        age: 36,
        sex: "F",
        time: "09:45 AM",
        note: "Allergy flare-up, sinus pressure",
    },
    Appointment {
        name: "Sarah Johnson",
        age: 45,
        sex: "F",
        time: "02:30 PM",
        note: "Headache recheck",
    },
];

const EMPTY_DAY: &[Appointment] = &[];

/// Appointment list for a variant index.
///
/// Indexes wrap, so any counter-derived value is a valid lookup.
pub fn variant(index: usize) -> &'static [Appointment] {
    match index % VARIANT_COUNT {
        0 => FULL_DAY,
        1 => LIGHT_DAY,
        _ => EMPTY_DAY,
    }
}
