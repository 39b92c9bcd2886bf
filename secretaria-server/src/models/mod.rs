//! Domain models: entity rows, request payloads, and response shapes
//!
//! Each entity module carries three layers:
//! - the database row struct (`FromRow` + `Serialize`)
//! - create/update payloads (`Deserialize`, partial updates use `Option`)
//! - "with related" response structs embedding nested summaries
//!
//! Field names stay in Portuguese: they are the wire contract of the
//! system this service replaces.

pub mod aluno;
pub mod carteira;
pub mod departamento;
pub mod disciplina;
pub mod matricula;
pub mod pagination;
pub mod professor;
pub mod validation;

pub use aluno::{Aluno, AlunoComRelacionados, AlunoUpdate, Cpf, NovoAluno};
pub use carteira::{Carteira, CarteiraComAluno, CarteiraUpdate, NovaCarteira, NumeroRegistro};
pub use departamento::{
    CodigoDepartamento, Departamento, DepartamentoComRelacionados, DepartamentoUpdate,
    NovoDepartamento,
};
pub use disciplina::{Disciplina, DisciplinaComRelacionados, DisciplinaUpdate, NovaDisciplina};
pub use matricula::{
    Matricula, MatriculaComRelacionados, MatriculaUpdate, NovaMatricula, Semestre,
};
pub use pagination::{ListParams, Page};
pub use professor::{NovoProfessor, Professor, ProfessorComRelacionados, ProfessorUpdate};
pub use validation::ValidationError;
