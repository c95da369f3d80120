pub const PHRASES: &[(&str, &[&str])] = &[
    ("welcome", &["Willkommen!"]),
    (
        "error-prompt",
        &["Welche Art von Fehler möchtest Du hervorrufen: Ausbleibende Antwort, ungültige Antwort, oder Laufzeitfehler?"],
    ),
    (
        "error-help",
        &[concat!(
            "Eine ausbleibende Antwort entsteht, wenn die Funktion zu lange braucht, um zu antworten. <break time=\"300ms\"/>",
            "Eine ungültige Antwort enthält Inhalte, die der Sprachdienst nicht verarbeiten kann. <break time=\"300ms\"/>",
            "Ein Laufzeitfehler ist, wenn die Ausführung der Funktion aufgrund eines Fehlers vorzeitig abbricht. <break time=\"300ms\"/>",
        )],
    ),
    ("error-reject", &["Das ist kein unterstützter Fehlertyp."]),
    (
        "error-confirm",
        &[
            "Gerne! <break time=\"500ms\"/>",
            "Wie Du magst! <break time=\"500ms\"/>",
            "Alles klar! <break time=\"500ms\"/>",
        ],
    ),
    ("error-sound", &[super::ERROR_SOUND]),
    ("goodbye-default", &["Bis bald!"]),
    ("goodbye-error", &["Verzeihung, da ist etwas schief gelaufen. Bitte versuche es später nochmal."]),
];
