//! Static reference material: reading shelves by area of law and a short FAQ.

/// A shelf of guide titles for one area of law.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceShelf {
    pub area: &'static str,
    pub titles: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const RESOURCE_SHELVES: &[ResourceShelf] = &[
    ResourceShelf {
        area: "Civil Law",
        titles: &[
            "Contract Law Basics",
            "Property Rights",
            "Tenant Rights",
            "Small Claims Court Guide",
        ],
    },
    ResourceShelf {
        area: "Criminal Law",
        titles: &[
            "Know Your Rights",
            "Criminal Procedure",
            "Rights on Arrest",
            "Bail and Bond Process",
        ],
    },
    ResourceShelf {
        area: "Family Law",
        titles: &[
            "Marriage and Divorce",
            "Child Custody Basics",
            "Adoption Process",
            "Domestic Violence Resources",
        ],
    },
    ResourceShelf {
        area: "Business Law",
        titles: &[
            "Starting a Business",
            "Employment Law",
            "Intellectual Property",
            "Business Contracts",
        ],
    },
];

pub const FAQS: &[Faq] = &[
    Faq {
        question: "What should I do if I'm being sued?",
        answer: "Don't ignore it. Respond by the deadline, consider hiring an advocate, \
                 gather relevant documents, and understand the claims against you.",
    },
    Faq {
        question: "How do I find a good lawyer?",
        answer: "Bar association referrals, legal aid services and personal recommendations \
                 are good starting points. Check experience and reviews, and meet more than \
                 one before deciding.",
    },
    Faq {
        question: "What's the difference between civil and criminal law?",
        answer: "Criminal law deals with offences against the state, such as theft or \
                 assault. Civil law handles disputes between individuals or organisations, \
                 such as contracts or property.",
    },
];

/// Find the shelf for an area of law, ignoring case.
pub fn shelf(area: &str) -> Option<&'static ResourceShelf> {
    let area = area.trim();
    RESOURCE_SHELVES
        .iter()
        .find(|s| s.area.eq_ignore_ascii_case(area))
}
