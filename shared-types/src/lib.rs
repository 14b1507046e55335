pub mod application;
pub mod company;
pub mod contact;
pub mod document;
pub mod envelope;
pub mod mapping;

pub use application::{
    Application, ApplicationBody, ApplicationCreated, ApplicationPayload, ApplicationStatus,
    ApplicationsBody, CompanyRef, DocumentRef, JobTitleRef, UnknownStatus,
};
pub use company::{
    CompaniesBody, Company, CompanyBody, CompanyIdBody, CompanyListing, CompanyPayload,
    CompanySuggestion, CompanySummary, RawNamesBody, SidebarBody, SuggestionsBody,
};
pub use contact::{CompanyContact, ContactListing, ContactsBody};
pub use document::{
    DocumentListing, DocumentType, DocumentUploaded, DocumentsBody, UnknownDocumentType,
};
pub use envelope::{Empty, Envelope, ErrorDetail, STATUS_ERROR, STATUS_SUCCESS};
pub use mapping::{
    BatchOutcome, MapBatchRequest, MapCompanyRequest, MapExistingRequest, MapNewRequest,
    MapSelfRequest, MappingAction, MappingOutcome, MappingState, NextCompanyBody,
    RegenerateOutcome, UnmappedListBody, UnmappedName,
};
