pub mod domain;
pub mod limits;
pub mod ports;
pub mod storage_path;

pub use domain::{
    GenerationRequest, GenerationStatus, Notebook, NotebookDetails, ProcessingStatus, Source,
    SourceType, SourceUpdate,
};
pub use ports::{
    DetailsGenerationService, GeneratorBackend, NotebookStore, ObjectStorageService,
    PageReaderService, PortError, PortResult, SpeechToTextService, StoredObject,
    TitleGenerationService,
};
