use sqlx::PgConnection;

use datafreeze_core::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
pub struct RawTable {
    pub schema_name: String,
    pub table_name: String,
}

pub async fn list_tables(conn: &mut PgConnection) -> Result<Vec<RawTable>> {
    sqlx::query_as::<_, RawTable>(
        r#"
        select
          n.nspname::text as schema_name,
          c.relname::text as table_name
        from pg_class c
        join pg_namespace n on n.oid = c.relnamespace
        where c.relkind in ('r', 'p')
          and not c.relispartition
        order by lower(n.nspname), lower(c.relname), n.nspname, c.relname
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|err| Error::MetadataRead(err.to_string()))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawPrimaryKey {
    pub schema_name: String,
    pub table_name: String,
    pub columns: Vec<String>,
}

pub async fn list_primary_keys(conn: &mut PgConnection) -> Result<Vec<RawPrimaryKey>> {
    sqlx::query_as::<_, RawPrimaryKey>(
        r#"
        select
          n.nspname::text as schema_name,
          c.relname::text as table_name,
          array_agg(a.attname::text order by k.ordinality) as columns
        from pg_constraint con
        join pg_class c on c.oid = con.conrelid
        join pg_namespace n on n.oid = c.relnamespace
        join unnest(con.conkey) with ordinality as k(attnum, ordinality) on true
        join pg_attribute a on a.attrelid = c.oid and a.attnum = k.attnum
        where con.contype = 'p'
        group by n.nspname, c.relname
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|err| Error::MetadataRead(err.to_string()))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawColumn {
    pub ordinal_position: i16,
    pub name: String,
    pub data_type: String,
    pub udt_name: String,
    pub type_category: String,
    pub is_generated: bool,
}

pub async fn list_columns(
    conn: &mut PgConnection,
    schema: &str,
    table: &str,
) -> Result<Vec<RawColumn>> {
    sqlx::query_as::<_, RawColumn>(
        r#"
        select
          a.attnum as ordinal_position,
          a.attname::text as name,
          case
            when t.typtype = 'd' then pg_catalog.format_type(t.typbasetype, t.typtypmod)
            else pg_catalog.format_type(a.atttypid, a.atttypmod)
          end as data_type,
          coalesce(bt.typname, t.typname)::text as udt_name,
          coalesce(bt.typcategory, t.typcategory)::text as type_category,
          (a.attgenerated <> '') as is_generated
        from pg_attribute a
        join pg_class c on c.oid = a.attrelid
        join pg_namespace n on n.oid = c.relnamespace
        join pg_type t on t.oid = a.atttypid
        left join pg_type bt on t.typtype = 'd' and bt.oid = t.typbasetype
        where n.nspname = $1
          and c.relname = $2
          and a.attnum > 0
          and not a.attisdropped
        order by a.attnum
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(&mut *conn)
    .await
    .map_err(|err| Error::MetadataRead(err.to_string()))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawAnnotation {
    pub schema_name: String,
    pub table_name: String,
    pub column_name: String,
    pub column_position: i16,
    pub comment: String,
}

pub async fn list_annotations(conn: &mut PgConnection, prefix: &str) -> Result<Vec<RawAnnotation>> {
    sqlx::query_as::<_, RawAnnotation>(
        r#"
        select
          n.nspname::text as schema_name,
          c.relname::text as table_name,
          a.attname::text as column_name,
          a.attnum as column_position,
          d.description as comment
        from pg_description d
        join pg_class c on c.oid = d.objoid
        join pg_namespace n on n.oid = c.relnamespace
        join pg_attribute a on a.attrelid = c.oid and a.attnum = d.objsubid
        where d.classoid = 'pg_catalog.pg_class'::regclass
          and d.objsubid > 0
          and c.relkind in ('r', 'p')
          and not a.attisdropped
          and a.attgenerated = ''
          and strpos(d.description, $1) > 0
        order by n.nspname, c.relname, a.attnum
        "#,
    )
    .bind(prefix)
    .fetch_all(&mut *conn)
    .await
    .map_err(|err| Error::MetadataRead(err.to_string()))
}
