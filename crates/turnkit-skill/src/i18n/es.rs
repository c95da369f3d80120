pub const PHRASES: &[(&str, &[&str])] = &[
    ("welcome", &["¡Te doy la bienvenida!"]),
    (
        "error-prompt",
        &["¿Qué tipo de error quieres disparar: tiempo agotado, respuesta inválida, o error en tiempo de ejecución?"],
    ),
    (
        "error-help",
        &[concat!(
            "Un error de tiempo agotado sucede cuando la función tarda demasiado en responder. <break time=\"300ms\"/>",
            "Una respuesta inválida sucede cuando el servicio de voz recibe una respuesta con propiedades inesperadas. <break time=\"300ms\"/>",
            "Una excepción en tiempo de ejecución sucede cuando un error en el código impide que se complete la ejecución. <break time=\"300ms\"/>",
        )],
    ),
    ("error-reject", &["No has dicho un tipo de error soportado."]),
    (
        "error-confirm",
        &[
            "¡Claro!  <break time=\"500ms\"/>",
            "¡Tus deseos son órdenes!  <break time=\"500ms\"/>",
            "¡Vale!  <break time=\"500ms\"/>",
        ],
    ),
    ("error-sound", &[super::ERROR_SOUND]),
    ("goodbye-default", &["¡Adiós!"]),
    ("goodbye-error", &["Perdona, algo ha ido mal. Por favor, inténtalo otra vez."]),
];
