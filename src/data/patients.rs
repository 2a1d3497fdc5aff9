//! Mock patient records and visit workspace options
//!
//! Fixed collaborators for the patient-detail workspace. Lookup is by
//! patient id; unknown ids are the caller's problem (the portal falls
//! back to the first record, and so does the CLI).

use serde::Serialize;

/// Summary of the most recent visit
#[derive(Debug, Clone, Serialize)]
pub struct LastVisit {
    pub date: &'static str,
    pub visit_type: &'static str,
    pub assessment: &'static str,
    pub treatment: &'static str,
    pub notes: &'static str,
}

/// One entry in the SOAP note history
#[derive(Debug, Clone, Serialize)]
pub struct SoapEntry {
    pub date: &'static str,
    pub time: &'static str,
}

/// Full patient detail record
#[derive(Debug, Clone, Serialize)]
pub struct PatientRecord {
    pub id: &'static str,
    pub name: &'static str,
    pub meta: &'static str,
    pub complaint: &'static str,
    pub last_visit: LastVisit,
    pub soap: &'static [SoapEntry],
}

const PATIENTS: &[PatientRecord] = &[
    PatientRecord {
        id: "a1",
        name: "Sarah Johnson",
        meta: "45 yrs, Female • Patient ID: SJ12345",
        complaint: "Patient reports persistent headaches for the past two weeks, \
                    accompanied by occasional dizziness. Worse in afternoons. No visual \
                    disturbances or nausea. Increased stress at work.",
        last_visit: LastVisit {
            date: "September 22, 2025 – 02:30 PM",
            visit_type: "Follow-up Visit",
            assessment: "Tension headaches – improving with conservative management",
            treatment: "Stress management, PRN ibuprofen",
            notes: "Improvement after stress management techniques. Headaches reduced \
                    from daily to 2–3 times/week with good relief from ibuprofen.",
        },
        soap: &[
            SoapEntry { date: "September 22, 2025", time: "02:30 PM" },
            SoapEntry { date: "August 15, 2025", time: "10:00 AM" },
            SoapEntry { date: "June 10, 2025", time: "03:15 PM" },
            SoapEntry { date: "March 28, 2025", time: "11:30 AM" },
        ],
    },
    PatientRecord {
        id: "b1",
        name: "Priya Nair",
        meta: "36 yrs, Female • Patient ID: PN88420",
        complaint: "Allergy flare-up and sinus pressure for 5 days. Worse in mornings. \
                    No fever. OTC antihistamines with mild relief.",
        last_visit: LastVisit {
            date: "July 02, 2025 – 11:10 AM",
            visit_type: "Initial Consult",
            assessment: "Seasonal allergic rhinitis",
            treatment: "Daily antihistamine, saline rinse",
            notes: "Trigger avoidance advised; follow up if symptoms persist beyond 2 weeks.",
        },
        soap: &[
            SoapEntry { date: "July 02, 2025", time: "11:10 AM" },
            SoapEntry { date: "May 10, 2025", time: "09:45 AM" },
        ],
    },
];

/// Look up a patient by id
pub fn patient(id: &str) -> Option<&'static PatientRecord> {
    PATIENTS.iter().find(|p| p.id == id)
}

/// The record shown when an id is unknown
pub fn fallback_patient() -> &'static PatientRecord {
    &PATIENTS[0]
}

/// One selectable action in the visit workspace panel
#[derive(Debug, Clone, Serialize)]
pub struct VisitOption {
    pub id: &'static str,
    pub icon: &'static str,
    pub title: &'static str,
    pub sub: &'static str,
}

/// The workspace actions, in display order. Ids line up with the
/// `visit` workflow's choice options.
pub const VISIT_OPTIONS: &[VisitOption] = &[
    VisitOption {
        id: "upload",
        icon: "📤",
        title: "Upload Conversation",
        sub: "File type (mp4, etc.)",
    },
    VisitOption {
        id: "recap",
        icon: "💬",
        title: "Recap Call",
        sub: "Chat with AI and summarize",
    },
    VisitOption {
        id: "voice",
        icon: "🎙️",
        title: "Voice Record",
        sub: "Dictate notes in real-time",
    },
    VisitOption {
        id: "call",
        icon: "📞",
        title: "Commence Call",
        sub: "Call the patient directly",
    },
];

/// Look up a visit option by id
pub fn visit_option(id: &str) -> Option<&'static VisitOption> {
    VISIT_OPTIONS.iter().find(|o| o.id == id)
}
