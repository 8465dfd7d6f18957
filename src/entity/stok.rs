use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stok")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub stok_id: Uuid,
    #[sea_orm(unique)]
    pub nama_barang: String,
    pub kategori: Option<String>,
    pub jumlah: i32,
    pub harga: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
