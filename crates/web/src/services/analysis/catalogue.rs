//! The nine "Talk Like TED" principles and their reference talks.

use std::fmt::Write as _;

/// A reference TED talk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTalk {
    pub speaker: &'static str,
    pub title: &'static str,
}

/// One principle of the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principle {
    /// Key the model must use in its JSON answer.
    pub name: &'static str,
    /// One-line rubric.
    pub rubric: &'static str,
    /// Talk that shows the principle done well.
    pub reference: ReferenceTalk,
}

/// Carmine Gallo's nine principles, as read by the TEDxBrașov curator.
pub const PRINCIPLES: [Principle; 9] = [
    Principle {
        name: "Pasiunea",
        rubric: "Ce îți face sufletul să cânte? Discursul pornește de la motivația autentică.",
        reference: ReferenceTalk {
            speaker: "Aimee Mullins",
            title: "The opportunity of adversity",
        },
    },
    Principle {
        name: "Povestea",
        rubric: "Poveștile conectează la audiență și schimbă percepțiile.",
        reference: ReferenceTalk {
            speaker: "Bryan Stevenson",
            title: "We need to talk about an injustice",
        },
    },
    Principle {
        name: "Conversatia",
        rubric: "Nu monolog, ci dialog natural cu publicul.",
        reference: ReferenceTalk {
            speaker: "Amy Cuddy",
            title: "Your body language may shape who you are",
        },
    },
    Principle {
        name: "Ceva Nou",
        rubric: "Învață audiența ceva pe care nu l-a știut înainte.",
        reference: ReferenceTalk {
            speaker: "Hans Rosling",
            title: "The best stats you've ever seen",
        },
    },
    Principle {
        name: "WOW Factor",
        rubric: "Depășește așteptările, lasă audiența cu gura căscată.",
        reference: ReferenceTalk {
            speaker: "Bill Gates",
            title: "Mosquitos, malaria and education",
        },
    },
    Principle {
        name: "Umor",
        rubric: "Sare și piper: creierul reține mai bine când râde.",
        reference: ReferenceTalk {
            speaker: "Ken Robinson",
            title: "Do schools kill creativity?",
        },
    },
    Principle {
        name: "Regula celor 18 min",
        rubric: "Regula celor 18 minute și regula celor 3: titlu, 3 mesaje cheie, structură clară.",
        reference: ReferenceTalk {
            speaker: "Simon Sinek",
            title: "How great leaders inspire action",
        },
    },
    Principle {
        name: "Multisenzorial",
        rubric: "Vorbește prin imagine, metafore vizuale, experiențe senzoriale.",
        reference: ReferenceTalk {
            speaker: "Jill Bolte Taylor",
            title: "My stroke of insight",
        },
    },
    Principle {
        name: "Autenticitate",
        rubric: "Fii transparent, scopul nu e prezentarea ci inspirarea.",
        reference: ReferenceTalk {
            speaker: "Brené Brown",
            title: "The power of vulnerability",
        },
    },
];

/// The catalogue as a numbered prompt section.
#[must_use]
pub fn render() -> String {
    let mut out =
        String::from("Cele 9 principii \"Talk Like TED\" (Carmine Gallo), prin vocea curatorului TEDxBrașov:\n");
    for (i, principle) in PRINCIPLES.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} - {} (exemplu: {}, \"{}\")",
            i + 1,
            principle.name.to_uppercase(),
            principle.rubric,
            principle.reference.speaker,
            principle.reference.title,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        for (i, a) in PRINCIPLES.iter().enumerate() {
            assert!(PRINCIPLES[i + 1..].iter().all(|b| b.name != a.name), "{}", a.name);
        }
    }

    #[test]
    fn test_render_numbers_every_principle() {
        let rendered = render();
        assert!(rendered.contains("1. PASIUNEA"));
        assert!(rendered.contains("9. AUTENTICITATE"));
        assert!(rendered.contains("Hans Rosling"));
        assert_eq!(rendered.lines().count(), 10);
    }
}
