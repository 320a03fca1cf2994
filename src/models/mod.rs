// ============================================================================
// MODELS - MÓDULO PRINCIPAL
// ============================================================================
//
// Description:
//   Ponto de entrada de todos os modelos de dados.
//   Cada modelo corresponde a uma tabela (SQLite local ou PostgreSQL) com
//   SeaORM; as entidades servem ao mesmo tempo para criar o schema e para
//   decodificar as linhas devolvidas pelo adaptador de consultas.
//
// Lista dos módulos:
//   - health : Health check API
//   - patients : Pacientes do funil de recrutamento
//   - documents : Arquivos anexados aos pacientes
//   - appointments : Agendamentos
//   - settings : Configurações chave/valor (logo)
//   - users : Contas de usuário (aprovação + papel)
//   - session_tokens : Tokens de sessão (expiram em 7 dias)
//   - dto : Data Transfer Objects da API
//
// Points d'attention:
//   - Colunas em snake_case no banco, nomes camelCase no JSON
//   - As consultas são SQL neutro com `?` (ver db::dialect)
//
// ============================================================================

pub mod health;
pub mod patients;
pub mod documents;
pub mod appointments;
pub mod settings;
pub mod users;
pub mod session_tokens;
pub mod dto;
