use std::path::PathBuf;

use thiserror::Error;

/// Every failure the report core can produce.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("ID de equipo vacio")]
    EmptyEquipmentId,

    #[error("Severidad invalida: {0:?} (use Alto/Medio/Bajo)")]
    InvalidSeverity(String),

    #[error("Numero de serie invalido: {0} (debe ser un entero positivo)")]
    InvalidSerialNumber(String),

    #[error("Version invalida: {0:?} (debe ser A.B.C con numeros)")]
    InvalidSoftwareVersion(String),

    #[error("Fecha invalida: {0:?} (use YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Tipo invalido para reporte: {0:?} (use Hardware/Software)")]
    InvalidReportKind(String),

    #[error("No hay reportes registrados")]
    EmptyCollection,

    #[error("Error de almacenamiento en {}: {source}", path.display())]
    StorageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Almacenamiento dañado en {}: {reason}", path.display())]
    StorageCorrupt { path: PathBuf, reason: String },

    #[error("Error al crear archivo {}: {source}", path.display())]
    ExportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ReportError::EmptyEquipmentId
                | ReportError::InvalidSeverity(_)
                | ReportError::InvalidSerialNumber(_)
                | ReportError::InvalidSoftwareVersion(_)
                | ReportError::InvalidDate(_)
                | ReportError::InvalidReportKind(_)
        )
    }

    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            ReportError::StorageIo { .. } | ReportError::StorageCorrupt { .. }
        )
    }
}
