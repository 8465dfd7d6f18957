use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "role")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub role_id: i32,
    #[sea_orm(unique)]
    pub nama_role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pengguna::Entity")]
    Pengguna,
}

impl Related<super::pengguna::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pengguna.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
