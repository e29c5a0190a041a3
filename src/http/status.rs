//! # Códigos de Estado HTTP
//!
//! Este módulo define los códigos de estado HTTP/1.1 que produce el servidor:
//!
//! - **2xx**: Éxito (200 OK, 201 Created)
//! - **4xx**: Error del cliente (400, 404, 406, 413)

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 201 Created - Archivo subido correctamente
    Created = 201,

    /// 400 Bad Request - Request line o headers malformados
    BadRequest = 400,

    /// 404 Not Found - Ruta o archivo no encontrado
    NotFound = 404,

    /// 406 Not Acceptable - Usado cuando falla la subida de un archivo
    NotAcceptable = 406,

    /// 413 Payload Too Large - El request supera el límite configurado
    PayloadTooLarge = 413,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use minihttp::http::StatusCode;
    /// assert_eq!(StatusCode::Created.as_u16(), 201);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) estándar asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use minihttp::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::NotAcceptable => "Not Acceptable",
            StatusCode::PayloadTooLarge => "Payload Too Large",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Ok | StatusCode::Created)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
